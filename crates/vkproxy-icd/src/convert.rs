//! Structure translation between the application's view and the native one.
//!
//! Two renditions exist. `passthrough` copies a structure and patches the
//! fields that carry wrapped handles or counts. `field_wise` builds the
//! native structure member by member, which is required wherever the
//! application and native layouts can differ (32-bit targets). The
//! `struct-conversion` feature selects `field_wise` on other targets.

use ash::vk;

/// Copy and patch.
pub mod passthrough {
    use ash::vk;

    /// Native submit info using `command_buffers` in place of the wrapped list.
    pub fn submit_info<'a>(info: &vk::SubmitInfo<'a>, command_buffers: &'a [vk::CommandBuffer]) -> vk::SubmitInfo<'a> {
        let mut native = *info;
        native.command_buffer_count = command_buffers.len() as u32;
        native.p_command_buffers = command_buffers.as_ptr();
        native
    }

    /// Allocate info asking for exactly one command buffer.
    pub fn command_buffer_allocate_info<'a>(
        info: &vk::CommandBufferAllocateInfo<'a>,
    ) -> vk::CommandBufferAllocateInfo<'a> {
        let mut native = *info;
        native.command_buffer_count = 1;
        native
    }
}

/// Member by member.
pub mod field_wise {
    use ash::vk;

    /// Native submit info using `command_buffers` in place of the wrapped list.
    pub fn submit_info<'a>(info: &vk::SubmitInfo<'a>, command_buffers: &'a [vk::CommandBuffer]) -> vk::SubmitInfo<'a> {
        let mut native = vk::SubmitInfo::default();
        native.s_type = info.s_type;
        native.p_next = info.p_next;
        native.wait_semaphore_count = info.wait_semaphore_count;
        native.p_wait_semaphores = info.p_wait_semaphores;
        native.p_wait_dst_stage_mask = info.p_wait_dst_stage_mask;
        native.command_buffer_count = command_buffers.len() as u32;
        native.p_command_buffers = command_buffers.as_ptr();
        native.signal_semaphore_count = info.signal_semaphore_count;
        native.p_signal_semaphores = info.p_signal_semaphores;
        native
    }

    /// Allocate info asking for exactly one command buffer.
    pub fn command_buffer_allocate_info<'a>(
        info: &vk::CommandBufferAllocateInfo<'a>,
    ) -> vk::CommandBufferAllocateInfo<'a> {
        let mut native = vk::CommandBufferAllocateInfo::default();
        native.s_type = info.s_type;
        native.p_next = info.p_next;
        native.command_pool = info.command_pool;
        native.level = info.level;
        native.command_buffer_count = 1;
        native
    }
}

#[cfg(any(feature = "struct-conversion", target_pointer_width = "32"))]
use field_wise as active;
#[cfg(not(any(feature = "struct-conversion", target_pointer_width = "32")))]
use passthrough as active;

/// Whether this build translates structures field by field.
pub const FIELD_WISE: bool = cfg!(any(feature = "struct-conversion", target_pointer_width = "32"));

pub fn submit_info<'a>(info: &vk::SubmitInfo<'a>, command_buffers: &'a [vk::CommandBuffer]) -> vk::SubmitInfo<'a> {
    active::submit_info(info, command_buffers)
}

pub fn command_buffer_allocate_info<'a>(info: &vk::CommandBufferAllocateInfo<'a>) -> vk::CommandBufferAllocateInfo<'a> {
    active::command_buffer_allocate_info(info)
}
