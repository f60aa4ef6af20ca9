//! Descriptor set layout, pool and set commands.

use ash::vk;

use crate::thunk::thunks;

thunks! {
    fn vkCreateDescriptorSetLayout(
        device: vk::Device,
        p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_set_layout: *mut vk::DescriptorSetLayout,
    ) -> vk::Result => create_descriptor_set_layout;
    fn vkDestroyDescriptorSetLayout(
        device: vk::Device,
        descriptor_set_layout: vk::DescriptorSetLayout,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_descriptor_set_layout;
    fn vkCreateDescriptorPool(
        device: vk::Device,
        p_create_info: *const vk::DescriptorPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_descriptor_pool: *mut vk::DescriptorPool,
    ) -> vk::Result => create_descriptor_pool;
    fn vkDestroyDescriptorPool(device: vk::Device, descriptor_pool: vk::DescriptorPool, p_allocator: *const vk::AllocationCallbacks<'_>) => destroy_descriptor_pool;
    fn vkResetDescriptorPool(device: vk::Device, descriptor_pool: vk::DescriptorPool, flags: vk::DescriptorPoolResetFlags) -> vk::Result => reset_descriptor_pool;
    fn vkAllocateDescriptorSets(
        device: vk::Device,
        p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
        p_descriptor_sets: *mut vk::DescriptorSet,
    ) -> vk::Result => allocate_descriptor_sets;
    fn vkFreeDescriptorSets(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
    ) -> vk::Result => free_descriptor_sets;
    fn vkUpdateDescriptorSets(
        device: vk::Device,
        descriptor_write_count: u32,
        p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
        descriptor_copy_count: u32,
        p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
    ) => update_descriptor_sets;
}
