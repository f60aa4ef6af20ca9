//! Memory and buffer commands.

use std::ffi::c_void;

use ash::vk;

use crate::thunk::thunks;

thunks! {
    fn vkAllocateMemory(
        device: vk::Device,
        p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_memory: *mut vk::DeviceMemory,
    ) -> vk::Result => allocate_memory;
    fn vkFreeMemory(device: vk::Device, memory: vk::DeviceMemory, p_allocator: *const vk::AllocationCallbacks<'_>) => free_memory;
    fn vkMapMemory(
        device: vk::Device,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        flags: vk::MemoryMapFlags,
        pp_data: *mut *mut c_void,
    ) -> vk::Result => map_memory;
    fn vkUnmapMemory(device: vk::Device, memory: vk::DeviceMemory) => unmap_memory;
    fn vkFlushMappedMemoryRanges(device: vk::Device, memory_range_count: u32, p_memory_ranges: *const vk::MappedMemoryRange<'_>) -> vk::Result => flush_mapped_memory_ranges;
    fn vkInvalidateMappedMemoryRanges(device: vk::Device, memory_range_count: u32, p_memory_ranges: *const vk::MappedMemoryRange<'_>) -> vk::Result => invalidate_mapped_memory_ranges;
    fn vkGetDeviceMemoryCommitment(device: vk::Device, memory: vk::DeviceMemory, p_committed_memory_in_bytes: *mut vk::DeviceSize) => get_device_memory_commitment;

    fn vkBindBufferMemory(device: vk::Device, buffer: vk::Buffer, memory: vk::DeviceMemory, memory_offset: vk::DeviceSize) -> vk::Result => bind_buffer_memory;
    fn vkBindImageMemory(device: vk::Device, image: vk::Image, memory: vk::DeviceMemory, memory_offset: vk::DeviceSize) -> vk::Result => bind_image_memory;
    fn vkBindBufferMemory2KHR(device: vk::Device, bind_info_count: u32, p_bind_infos: *const vk::BindBufferMemoryInfo<'_>) -> vk::Result => bind_buffer_memory2_khr;
    fn vkBindImageMemory2KHR(device: vk::Device, bind_info_count: u32, p_bind_infos: *const vk::BindImageMemoryInfo<'_>) -> vk::Result => bind_image_memory2_khr;

    fn vkGetBufferMemoryRequirements(device: vk::Device, buffer: vk::Buffer, p_memory_requirements: *mut vk::MemoryRequirements) => get_buffer_memory_requirements;
    fn vkGetImageMemoryRequirements(device: vk::Device, image: vk::Image, p_memory_requirements: *mut vk::MemoryRequirements) => get_image_memory_requirements;
    fn vkGetImageSparseMemoryRequirements(
        device: vk::Device,
        image: vk::Image,
        p_sparse_memory_requirement_count: *mut u32,
        p_sparse_memory_requirements: *mut vk::SparseImageMemoryRequirements,
    ) => get_image_sparse_memory_requirements;
    fn vkGetBufferMemoryRequirements2KHR(
        device: vk::Device,
        p_info: *const vk::BufferMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) => get_buffer_memory_requirements2_khr;
    fn vkGetImageMemoryRequirements2KHR(
        device: vk::Device,
        p_info: *const vk::ImageMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) => get_image_memory_requirements2_khr;
    fn vkGetImageSparseMemoryRequirements2KHR(
        device: vk::Device,
        p_info: *const vk::ImageSparseMemoryRequirementsInfo2<'_>,
        p_sparse_memory_requirement_count: *mut u32,
        p_sparse_memory_requirements: *mut vk::SparseImageMemoryRequirements2<'_>,
    ) => get_image_sparse_memory_requirements2_khr;

    fn vkCreateBuffer(
        device: vk::Device,
        p_create_info: *const vk::BufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_buffer: *mut vk::Buffer,
    ) -> vk::Result => create_buffer;
    fn vkDestroyBuffer(device: vk::Device, buffer: vk::Buffer, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_buffer;
    fn vkCreateBufferView(
        device: vk::Device,
        p_create_info: *const vk::BufferViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::BufferView,
    ) -> vk::Result => create_buffer_view;
    fn vkDestroyBufferView(device: vk::Device, buffer_view: vk::BufferView, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_buffer_view;
}
