//! Render pass and framebuffer commands.

use ash::vk;

use crate::thunk::thunks;

thunks! {
    fn vkCreateRenderPass(
        device: vk::Device,
        p_create_info: *const vk::RenderPassCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_render_pass: *mut vk::RenderPass,
    ) -> vk::Result => create_render_pass;
    fn vkDestroyRenderPass(device: vk::Device, render_pass: vk::RenderPass, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_render_pass;
    fn vkGetRenderAreaGranularity(device: vk::Device, render_pass: vk::RenderPass, p_granularity: *mut vk::Extent2D) => get_render_area_granularity;
    fn vkCreateFramebuffer(
        device: vk::Device,
        p_create_info: *const vk::FramebufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_framebuffer: *mut vk::Framebuffer,
    ) -> vk::Result => create_framebuffer;
    fn vkDestroyFramebuffer(device: vk::Device, framebuffer: vk::Framebuffer, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_framebuffer;
}
