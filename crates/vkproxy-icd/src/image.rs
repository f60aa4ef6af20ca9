//! Image, image view and sampler commands.

use ash::vk;

use crate::thunk::thunks;

thunks! {
    fn vkCreateImage(
        device: vk::Device,
        p_create_info: *const vk::ImageCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_image: *mut vk::Image,
    ) -> vk::Result => create_image;
    fn vkDestroyImage(device: vk::Device, image: vk::Image, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_image;
    fn vkGetImageSubresourceLayout(
        device: vk::Device,
        image: vk::Image,
        p_subresource: *const vk::ImageSubresource,
        p_layout: *mut vk::SubresourceLayout,
    ) => get_image_subresource_layout;
    fn vkCreateImageView(
        device: vk::Device,
        p_create_info: *const vk::ImageViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::ImageView,
    ) -> vk::Result => create_image_view;
    fn vkDestroyImageView(device: vk::Device, image_view: vk::ImageView, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_image_view;
    fn vkCreateSampler(
        device: vk::Device,
        p_create_info: *const vk::SamplerCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_sampler: *mut vk::Sampler,
    ) -> vk::Result => create_sampler;
    fn vkDestroySampler(device: vk::Device, sampler: vk::Sampler, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_sampler;
}
