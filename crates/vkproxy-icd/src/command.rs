//! Command pools, command buffer wrappers and recording commands.

use std::ffi::c_void;
use std::ops::Deref;

use ash::vk;
use tracing::{error, trace, warn};

use crate::context::{IcdContext, LiveObject};
use crate::convert;
use crate::device::Device;
use crate::dispatch::{dispatchable, Dispatchable, LoaderHeader};
use crate::dispatch_table::DeviceFns;
use crate::error::{check, IcdError};
use crate::ffi::{raw_slice, raw_slice_mut};
use crate::thunk::{thunks, Unwrap};

#[repr(C)]
pub struct CommandBuffer {
    header: LoaderHeader,
    handle: vk::CommandBuffer,
    /// Wrapped handle of the owning device.
    device: vk::Device,
    _live: LiveObject,
}

dispatchable!(CommandBuffer => vk::CommandBuffer);

impl CommandBuffer {
    pub fn native(&self) -> vk::CommandBuffer {
        self.handle
    }

    pub fn device(&self) -> Option<&Device> {
        unsafe { Device::from_handle(self.device) }
    }
}

impl Unwrap for vk::CommandBuffer {
    type Native = vk::CommandBuffer;
    type Table = DeviceFns;

    unsafe fn unwrap_native<'a>(self) -> Option<(vk::CommandBuffer, &'a DeviceFns)> {
        let buffer: &'a CommandBuffer = CommandBuffer::from_handle(self)?;
        let device: &'a Device = Device::from_handle(buffer.device)?;
        Some((buffer.handle, device.fns()))
    }
}

impl Device {
    /// Allocate `out.len()` command buffers, one native allocation each.
    ///
    /// Each wrapper is written to `out` before its native buffer is
    /// allocated. If allocation `k` fails, wrappers `0..=k` go through the
    /// free path (wrapper `k` has no native buffer, so only `k` native frees
    /// happen), `out[..k]` keeps the now dangling handles and `out[k..]` is
    /// null.
    ///
    /// # Safety
    /// `allocate_info` must be a valid Vulkan structure chain.
    pub unsafe fn allocate_command_buffers(
        &self,
        allocate_info: &vk::CommandBufferAllocateInfo<'_>,
        out: &mut [vk::CommandBuffer],
    ) -> Result<(), IcdError> {
        out.fill(vk::CommandBuffer::null());
        let allocate = self
            .fns()
            .allocate_command_buffers
            .ok_or_else(|| IcdError::missing("vkAllocateCommandBuffers"))?;
        let single = convert::command_buffer_allocate_info(allocate_info);

        for index in 0..out.len() {
            let mut buffer = Box::new(CommandBuffer {
                header: LoaderHeader::new(),
                handle: vk::CommandBuffer::null(),
                device: self.handle(),
                _live: self.context().track(),
            });
            let result = allocate(self.native(), &single, &mut buffer.handle);
            out[index] = buffer.into_handle();

            if let Err(err) = check(result) {
                error!("failed to allocate command buffer {} of {}: {}", index, out.len(), err);
                self.free_command_buffers(allocate_info.command_pool, &out[..=index]);
                out[index] = vk::CommandBuffer::null();
                return Err(err);
            }
        }
        Ok(())
    }

    /// Free wrapped command buffers. Null handles are skipped, and a wrapper
    /// without a native buffer is released without a native call.
    ///
    /// # Safety
    /// Each non-null handle must be a live command buffer of this device.
    pub unsafe fn free_command_buffers(&self, command_pool: vk::CommandPool, buffers: &[vk::CommandBuffer]) {
        let free = self.fns().free_command_buffers;
        for &handle in buffers {
            let Some(buffer) = CommandBuffer::reclaim(handle) else {
                continue;
            };
            if buffer.handle == vk::CommandBuffer::null() {
                continue;
            }
            match free {
                Some(free) => free(self.native(), command_pool, 1, &buffer.handle),
                None => warn!("vkFreeCommandBuffers unavailable, leaking native {:?}", buffer.handle),
            }
        }
    }
}

/// Native handles for a list of wrapped command buffers, alive for the
/// duration of one forwarded call. Counted as a live object of the context
/// until dropped.
pub(crate) struct NativeCommandBuffers {
    handles: Vec<vk::CommandBuffer>,
    _live: LiveObject,
}

impl Deref for NativeCommandBuffers {
    type Target = [vk::CommandBuffer];

    fn deref(&self) -> &[vk::CommandBuffer] {
        &self.handles
    }
}

/// Native handles for a list of wrapped command buffers, in order.
/// Null or unknown entries map to null.
///
/// # Safety
/// Every non-null handle must be a live command buffer of this driver.
pub(crate) unsafe fn unwrap_command_buffers(
    context: &IcdContext,
    wrapped: &[vk::CommandBuffer],
) -> Result<NativeCommandBuffers, IcdError> {
    let mut handles = Vec::new();
    handles.try_reserve_exact(wrapped.len())?;
    handles.extend(
        wrapped
            .iter()
            .map(|&handle| CommandBuffer::from_handle(handle).map_or(vk::CommandBuffer::null(), CommandBuffer::native)),
    );
    Ok(NativeCommandBuffers {
        handles,
        _live: context.track(),
    })
}

// ── Entry points ────────────────────────────────────────────

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkAllocateCommandBuffers(
    device: vk::Device,
    p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
    p_command_buffers: *mut vk::CommandBuffer,
) -> vk::Result {
    trace!("vkAllocateCommandBuffers {:?}", device);
    let Some(device) = Device::from_handle(device) else {
        return vk::Result::ERROR_DEVICE_LOST;
    };
    let Some(allocate_info) = p_allocate_info.as_ref() else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    let out = raw_slice_mut(p_command_buffers, allocate_info.command_buffer_count);

    match device.allocate_command_buffers(allocate_info, out) {
        Ok(()) => vk::Result::SUCCESS,
        Err(err) => err.into(),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkFreeCommandBuffers(
    device: vk::Device,
    command_pool: vk::CommandPool,
    command_buffer_count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    trace!("vkFreeCommandBuffers {:?} count={}", device, command_buffer_count);
    let Some(device) = Device::from_handle(device) else {
        return;
    };
    device.free_command_buffers(command_pool, raw_slice(p_command_buffers, command_buffer_count));
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCmdExecuteCommands(
    command_buffer: vk::CommandBuffer,
    command_buffer_count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    trace!("vkCmdExecuteCommands {:?} count={}", command_buffer, command_buffer_count);
    let Some(buffer) = CommandBuffer::from_handle(command_buffer) else {
        return;
    };
    let Some(device) = buffer.device() else {
        return;
    };
    let Some(execute) = device.fns().cmd_execute_commands else {
        crate::thunk::missing::<()>("vkCmdExecuteCommands");
        return;
    };

    match unwrap_command_buffers(device.context(), raw_slice(p_command_buffers, command_buffer_count)) {
        Ok(secondaries) => execute(buffer.native(), secondaries.len() as u32, secondaries.as_ptr()),
        Err(err) => error!("vkCmdExecuteCommands: {}", err),
    }
}

thunks! {
    fn vkCreateCommandPool(
        device: vk::Device,
        p_create_info: *const vk::CommandPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_command_pool: *mut vk::CommandPool,
    ) -> vk::Result => create_command_pool;
    fn vkDestroyCommandPool(device: vk::Device, command_pool: vk::CommandPool, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_command_pool;
    fn vkResetCommandPool(device: vk::Device, command_pool: vk::CommandPool, flags: vk::CommandPoolResetFlags) -> vk::Result => reset_command_pool;
    fn vkTrimCommandPoolKHR(device: vk::Device, command_pool: vk::CommandPool, flags: vk::CommandPoolTrimFlags) => trim_command_pool_khr;

    fn vkBeginCommandBuffer(command_buffer: vk::CommandBuffer, p_begin_info: *const vk::CommandBufferBeginInfo<'_>) -> vk::Result => begin_command_buffer;
    fn vkEndCommandBuffer(command_buffer: vk::CommandBuffer) -> vk::Result => end_command_buffer;
    fn vkResetCommandBuffer(command_buffer: vk::CommandBuffer, flags: vk::CommandBufferResetFlags) -> vk::Result => reset_command_buffer;

    // State
    fn vkCmdBindPipeline(command_buffer: vk::CommandBuffer, pipeline_bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline) => cmd_bind_pipeline;
    fn vkCmdSetViewport(command_buffer: vk::CommandBuffer, first_viewport: u32, viewport_count: u32, p_viewports: *const vk::Viewport) => cmd_set_viewport;
    fn vkCmdSetScissor(command_buffer: vk::CommandBuffer, first_scissor: u32, scissor_count: u32, p_scissors: *const vk::Rect2D) => cmd_set_scissor;
    fn vkCmdSetLineWidth(command_buffer: vk::CommandBuffer, line_width: f32) => cmd_set_line_width;
    fn vkCmdSetDepthBias(command_buffer: vk::CommandBuffer, depth_bias_constant_factor: f32, depth_bias_clamp: f32, depth_bias_slope_factor: f32) => cmd_set_depth_bias;
    fn vkCmdSetBlendConstants(command_buffer: vk::CommandBuffer, blend_constants: *const [f32; 4]) => cmd_set_blend_constants;
    fn vkCmdSetDepthBounds(command_buffer: vk::CommandBuffer, min_depth_bounds: f32, max_depth_bounds: f32) => cmd_set_depth_bounds;
    fn vkCmdSetStencilCompareMask(command_buffer: vk::CommandBuffer, face_mask: vk::StencilFaceFlags, compare_mask: u32) => cmd_set_stencil_compare_mask;
    fn vkCmdSetStencilWriteMask(command_buffer: vk::CommandBuffer, face_mask: vk::StencilFaceFlags, write_mask: u32) => cmd_set_stencil_write_mask;
    fn vkCmdSetStencilReference(command_buffer: vk::CommandBuffer, face_mask: vk::StencilFaceFlags, reference: u32) => cmd_set_stencil_reference;
    fn vkCmdBindDescriptorSets(
        command_buffer: vk::CommandBuffer,
        pipeline_bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
        dynamic_offset_count: u32,
        p_dynamic_offsets: *const u32,
    ) => cmd_bind_descriptor_sets;
    fn vkCmdBindIndexBuffer(command_buffer: vk::CommandBuffer, buffer: vk::Buffer, offset: vk::DeviceSize, index_type: vk::IndexType) => cmd_bind_index_buffer;
    fn vkCmdBindVertexBuffers(
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        binding_count: u32,
        p_buffers: *const vk::Buffer,
        p_offsets: *const vk::DeviceSize,
    ) => cmd_bind_vertex_buffers;
    fn vkCmdPushConstants(
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stage_flags: vk::ShaderStageFlags,
        offset: u32,
        size: u32,
        p_values: *const c_void,
    ) => cmd_push_constants;

    // Draw and dispatch
    fn vkCmdDraw(command_buffer: vk::CommandBuffer, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) => cmd_draw;
    fn vkCmdDrawIndexed(
        command_buffer: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) => cmd_draw_indexed;
    fn vkCmdDrawIndirect(command_buffer: vk::CommandBuffer, buffer: vk::Buffer, offset: vk::DeviceSize, draw_count: u32, stride: u32) => cmd_draw_indirect;
    fn vkCmdDrawIndexedIndirect(command_buffer: vk::CommandBuffer, buffer: vk::Buffer, offset: vk::DeviceSize, draw_count: u32, stride: u32) => cmd_draw_indexed_indirect;
    fn vkCmdDispatch(command_buffer: vk::CommandBuffer, group_count_x: u32, group_count_y: u32, group_count_z: u32) => cmd_dispatch;
    fn vkCmdDispatchIndirect(command_buffer: vk::CommandBuffer, buffer: vk::Buffer, offset: vk::DeviceSize) => cmd_dispatch_indirect;

    // Transfer
    fn vkCmdCopyBuffer(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        region_count: u32,
        p_regions: *const vk::BufferCopy,
    ) => cmd_copy_buffer;
    fn vkCmdCopyImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageCopy,
    ) => cmd_copy_image;
    fn vkCmdBlitImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageBlit,
        filter: vk::Filter,
    ) => cmd_blit_image;
    fn vkCmdCopyBufferToImage(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy,
    ) => cmd_copy_buffer_to_image;
    fn vkCmdCopyImageToBuffer(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_buffer: vk::Buffer,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy,
    ) => cmd_copy_image_to_buffer;
    fn vkCmdUpdateBuffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        data_size: vk::DeviceSize,
        p_data: *const c_void,
    ) => cmd_update_buffer;
    fn vkCmdFillBuffer(command_buffer: vk::CommandBuffer, dst_buffer: vk::Buffer, dst_offset: vk::DeviceSize, size: vk::DeviceSize, data: u32) => cmd_fill_buffer;
    fn vkCmdClearColorImage(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout,
        p_color: *const vk::ClearColorValue,
        range_count: u32,
        p_ranges: *const vk::ImageSubresourceRange,
    ) => cmd_clear_color_image;
    fn vkCmdClearDepthStencilImage(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout,
        p_depth_stencil: *const vk::ClearDepthStencilValue,
        range_count: u32,
        p_ranges: *const vk::ImageSubresourceRange,
    ) => cmd_clear_depth_stencil_image;
    fn vkCmdClearAttachments(
        command_buffer: vk::CommandBuffer,
        attachment_count: u32,
        p_attachments: *const vk::ClearAttachment,
        rect_count: u32,
        p_rects: *const vk::ClearRect,
    ) => cmd_clear_attachments;
    fn vkCmdResolveImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageResolve,
    ) => cmd_resolve_image;

    // Synchronization and queries
    fn vkCmdSetEvent(command_buffer: vk::CommandBuffer, event: vk::Event, stage_mask: vk::PipelineStageFlags) => cmd_set_event;
    fn vkCmdResetEvent(command_buffer: vk::CommandBuffer, event: vk::Event, stage_mask: vk::PipelineStageFlags) => cmd_reset_event;
    fn vkCmdWaitEvents(
        command_buffer: vk::CommandBuffer,
        event_count: u32,
        p_events: *const vk::Event,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        memory_barrier_count: u32,
        p_memory_barriers: *const vk::MemoryBarrier<'_>,
        buffer_memory_barrier_count: u32,
        p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
        image_memory_barrier_count: u32,
        p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
    ) => cmd_wait_events;
    fn vkCmdPipelineBarrier(
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barrier_count: u32,
        p_memory_barriers: *const vk::MemoryBarrier<'_>,
        buffer_memory_barrier_count: u32,
        p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
        image_memory_barrier_count: u32,
        p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
    ) => cmd_pipeline_barrier;
    fn vkCmdBeginQuery(command_buffer: vk::CommandBuffer, query_pool: vk::QueryPool, query: u32, flags: vk::QueryControlFlags) => cmd_begin_query;
    fn vkCmdEndQuery(command_buffer: vk::CommandBuffer, query_pool: vk::QueryPool, query: u32) => cmd_end_query;
    fn vkCmdResetQueryPool(command_buffer: vk::CommandBuffer, query_pool: vk::QueryPool, first_query: u32, query_count: u32) => cmd_reset_query_pool;
    fn vkCmdWriteTimestamp(command_buffer: vk::CommandBuffer, pipeline_stage: vk::PipelineStageFlags, query_pool: vk::QueryPool, query: u32) => cmd_write_timestamp;
    fn vkCmdCopyQueryPoolResults(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    ) => cmd_copy_query_pool_results;

    // Render passes
    fn vkCmdBeginRenderPass(
        command_buffer: vk::CommandBuffer,
        p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents,
    ) => cmd_begin_render_pass;
    fn vkCmdNextSubpass(command_buffer: vk::CommandBuffer, contents: vk::SubpassContents) => cmd_next_subpass;
    fn vkCmdEndRenderPass(command_buffer: vk::CommandBuffer) => cmd_end_render_pass;
}
