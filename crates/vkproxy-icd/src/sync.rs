//! Queue submission, fences, semaphores, events and query pools.

use std::ffi::c_void;

use ash::vk;
use tracing::{error, trace};

use crate::command::unwrap_command_buffers;
use crate::convert;
use crate::device::Queue;
use crate::dispatch::Dispatchable;
use crate::error::{check, IcdError};
use crate::ffi::raw_slice;
use crate::thunk::thunks;

impl Queue {
    /// Submit with every wrapped command buffer replaced by its native handle.
    ///
    /// # Safety
    /// `submits` must be valid Vulkan structures whose command buffers are
    /// live handles of this driver.
    pub unsafe fn submit(&self, submits: &[vk::SubmitInfo<'_>], fence: vk::Fence) -> Result<(), IcdError> {
        let device = self
            .device()
            .ok_or_else(|| IcdError::InitializationFailed("queue has no device".into()))?;
        let submit = device
            .fns()
            .queue_submit
            .ok_or_else(|| IcdError::missing("vkQueueSubmit"))?;

        // One native array per submit; they must outlive the native call.
        let mut command_buffers = Vec::new();
        command_buffers.try_reserve_exact(submits.len())?;
        for info in submits {
            command_buffers.push(unwrap_command_buffers(device.context(), raw_slice(
                info.p_command_buffers,
                info.command_buffer_count,
            ))?);
        }

        let mut native = Vec::new();
        native.try_reserve_exact(submits.len())?;
        native.extend(
            submits
                .iter()
                .zip(&command_buffers)
                .map(|(info, buffers)| convert::submit_info(info, buffers)),
        );

        check(submit(self.native(), native.len() as u32, native.as_ptr(), fence))
    }
}

// ── Entry points ────────────────────────────────────────────

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkQueueSubmit(
    queue: vk::Queue,
    submit_count: u32,
    p_submits: *const vk::SubmitInfo<'_>,
    fence: vk::Fence,
) -> vk::Result {
    trace!("vkQueueSubmit {:?} count={}", queue, submit_count);
    let Some(queue) = Queue::from_handle(queue) else {
        return vk::Result::ERROR_DEVICE_LOST;
    };

    match queue.submit(raw_slice(p_submits, submit_count), fence) {
        Ok(()) => vk::Result::SUCCESS,
        Err(IcdError::Native(result)) => result,
        Err(err) => {
            error!("vkQueueSubmit: {}", err);
            err.into()
        }
    }
}

thunks! {
    fn vkCreateFence(
        device: vk::Device,
        p_create_info: *const vk::FenceCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_fence: *mut vk::Fence,
    ) -> vk::Result => create_fence;
    fn vkDestroyFence(device: vk::Device, fence: vk::Fence, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_fence;
    fn vkResetFences(device: vk::Device, fence_count: u32, p_fences: *const vk::Fence) -> vk::Result => reset_fences;
    fn vkGetFenceStatus(device: vk::Device, fence: vk::Fence) -> vk::Result => get_fence_status;
    fn vkWaitForFences(device: vk::Device, fence_count: u32, p_fences: *const vk::Fence, wait_all: vk::Bool32, timeout: u64) -> vk::Result => wait_for_fences;

    fn vkCreateSemaphore(
        device: vk::Device,
        p_create_info: *const vk::SemaphoreCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_semaphore: *mut vk::Semaphore,
    ) -> vk::Result => create_semaphore;
    fn vkDestroySemaphore(device: vk::Device, semaphore: vk::Semaphore, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_semaphore;

    fn vkCreateEvent(
        device: vk::Device,
        p_create_info: *const vk::EventCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_event: *mut vk::Event,
    ) -> vk::Result => create_event;
    fn vkDestroyEvent(device: vk::Device, event: vk::Event, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_event;
    fn vkGetEventStatus(device: vk::Device, event: vk::Event) -> vk::Result => get_event_status;
    fn vkSetEvent(device: vk::Device, event: vk::Event) -> vk::Result => set_event;
    fn vkResetEvent(device: vk::Device, event: vk::Event) -> vk::Result => reset_event;

    fn vkCreateQueryPool(
        device: vk::Device,
        p_create_info: *const vk::QueryPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_query_pool: *mut vk::QueryPool,
    ) -> vk::Result => create_query_pool;
    fn vkDestroyQueryPool(device: vk::Device, query_pool: vk::QueryPool, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_query_pool;
    fn vkGetQueryPoolResults(
        device: vk::Device,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        data_size: usize,
        p_data: *mut c_void,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    ) -> vk::Result => get_query_pool_results;
}
