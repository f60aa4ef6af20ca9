//! Per-instance and per-device native function tables.
//!
//! Each entry is resolved by name through the native `vkGetInstanceProcAddr`
//! or `vkGetDeviceProcAddr`. An entry the native driver does not provide
//! stays `None`; callers treat that as unavailable rather than failing
//! object creation.

use std::ffi::CStr;

use ash::vk;

macro_rules! dispatch_table {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($field:ident: $pfn:ident = $symbol:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default)]
        pub struct $name {
            $(pub $field: Option<vk::$pfn>,)*
        }

        impl $name {
            /// Resolve every entry with `resolve`.
            pub fn load(mut resolve: impl FnMut(&CStr) -> vk::PFN_vkVoidFunction) -> Self {
                Self {
                    $($field: resolve($symbol).map(|f| unsafe {
                        std::mem::transmute::<unsafe extern "system" fn(), vk::$pfn>(f)
                    }),)*
                }
            }

            /// Names of the entries the native driver did not provide.
            pub fn missing(&self) -> Vec<&'static CStr> {
                let mut missing = Vec::new();
                $(if self.$field.is_none() {
                    missing.push($symbol);
                })*
                missing
            }
        }
    };
}

dispatch_table! {
    /// Instance-level commands, including physical device queries.
    pub struct InstanceFns {
        destroy_instance: PFN_vkDestroyInstance = c"vkDestroyInstance",
        enumerate_physical_devices: PFN_vkEnumeratePhysicalDevices = c"vkEnumeratePhysicalDevices",
        enumerate_device_extension_properties: PFN_vkEnumerateDeviceExtensionProperties = c"vkEnumerateDeviceExtensionProperties",
        create_device: PFN_vkCreateDevice = c"vkCreateDevice",
        get_device_proc_addr: PFN_vkGetDeviceProcAddr = c"vkGetDeviceProcAddr",
        get_physical_device_features: PFN_vkGetPhysicalDeviceFeatures = c"vkGetPhysicalDeviceFeatures",
        get_physical_device_format_properties: PFN_vkGetPhysicalDeviceFormatProperties = c"vkGetPhysicalDeviceFormatProperties",
        get_physical_device_image_format_properties: PFN_vkGetPhysicalDeviceImageFormatProperties = c"vkGetPhysicalDeviceImageFormatProperties",
        get_physical_device_memory_properties: PFN_vkGetPhysicalDeviceMemoryProperties = c"vkGetPhysicalDeviceMemoryProperties",
        get_physical_device_properties: PFN_vkGetPhysicalDeviceProperties = c"vkGetPhysicalDeviceProperties",
        get_physical_device_queue_family_properties: PFN_vkGetPhysicalDeviceQueueFamilyProperties = c"vkGetPhysicalDeviceQueueFamilyProperties",
        get_physical_device_sparse_image_format_properties: PFN_vkGetPhysicalDeviceSparseImageFormatProperties = c"vkGetPhysicalDeviceSparseImageFormatProperties",
        get_physical_device_features2_khr: PFN_vkGetPhysicalDeviceFeatures2 = c"vkGetPhysicalDeviceFeatures2KHR",
        get_physical_device_format_properties2_khr: PFN_vkGetPhysicalDeviceFormatProperties2 = c"vkGetPhysicalDeviceFormatProperties2KHR",
        get_physical_device_image_format_properties2_khr: PFN_vkGetPhysicalDeviceImageFormatProperties2 = c"vkGetPhysicalDeviceImageFormatProperties2KHR",
        get_physical_device_memory_properties2_khr: PFN_vkGetPhysicalDeviceMemoryProperties2 = c"vkGetPhysicalDeviceMemoryProperties2KHR",
        get_physical_device_properties2_khr: PFN_vkGetPhysicalDeviceProperties2 = c"vkGetPhysicalDeviceProperties2KHR",
        get_physical_device_queue_family_properties2_khr: PFN_vkGetPhysicalDeviceQueueFamilyProperties2 = c"vkGetPhysicalDeviceQueueFamilyProperties2KHR",
        get_physical_device_sparse_image_format_properties2_khr: PFN_vkGetPhysicalDeviceSparseImageFormatProperties2 = c"vkGetPhysicalDeviceSparseImageFormatProperties2KHR",
    }
}

dispatch_table! {
    /// Device-level commands, including queue and command buffer commands.
    pub struct DeviceFns {
        // Device and queues
        destroy_device: PFN_vkDestroyDevice = c"vkDestroyDevice",
        get_device_queue: PFN_vkGetDeviceQueue = c"vkGetDeviceQueue",
        device_wait_idle: PFN_vkDeviceWaitIdle = c"vkDeviceWaitIdle",
        queue_submit: PFN_vkQueueSubmit = c"vkQueueSubmit",
        queue_wait_idle: PFN_vkQueueWaitIdle = c"vkQueueWaitIdle",
        queue_bind_sparse: PFN_vkQueueBindSparse = c"vkQueueBindSparse",

        // Memory
        allocate_memory: PFN_vkAllocateMemory = c"vkAllocateMemory",
        free_memory: PFN_vkFreeMemory = c"vkFreeMemory",
        map_memory: PFN_vkMapMemory = c"vkMapMemory",
        unmap_memory: PFN_vkUnmapMemory = c"vkUnmapMemory",
        flush_mapped_memory_ranges: PFN_vkFlushMappedMemoryRanges = c"vkFlushMappedMemoryRanges",
        invalidate_mapped_memory_ranges: PFN_vkInvalidateMappedMemoryRanges = c"vkInvalidateMappedMemoryRanges",
        get_device_memory_commitment: PFN_vkGetDeviceMemoryCommitment = c"vkGetDeviceMemoryCommitment",
        bind_buffer_memory: PFN_vkBindBufferMemory = c"vkBindBufferMemory",
        bind_image_memory: PFN_vkBindImageMemory = c"vkBindImageMemory",
        bind_buffer_memory2_khr: PFN_vkBindBufferMemory2 = c"vkBindBufferMemory2KHR",
        bind_image_memory2_khr: PFN_vkBindImageMemory2 = c"vkBindImageMemory2KHR",
        get_buffer_memory_requirements: PFN_vkGetBufferMemoryRequirements = c"vkGetBufferMemoryRequirements",
        get_image_memory_requirements: PFN_vkGetImageMemoryRequirements = c"vkGetImageMemoryRequirements",
        get_image_sparse_memory_requirements: PFN_vkGetImageSparseMemoryRequirements = c"vkGetImageSparseMemoryRequirements",
        get_buffer_memory_requirements2_khr: PFN_vkGetBufferMemoryRequirements2 = c"vkGetBufferMemoryRequirements2KHR",
        get_image_memory_requirements2_khr: PFN_vkGetImageMemoryRequirements2 = c"vkGetImageMemoryRequirements2KHR",
        get_image_sparse_memory_requirements2_khr: PFN_vkGetImageSparseMemoryRequirements2 = c"vkGetImageSparseMemoryRequirements2KHR",
        create_buffer: PFN_vkCreateBuffer = c"vkCreateBuffer",
        destroy_buffer: PFN_vkDestroyBuffer = c"vkDestroyBuffer",
        create_buffer_view: PFN_vkCreateBufferView = c"vkCreateBufferView",
        destroy_buffer_view: PFN_vkDestroyBufferView = c"vkDestroyBufferView",

        // Images and samplers
        create_image: PFN_vkCreateImage = c"vkCreateImage",
        destroy_image: PFN_vkDestroyImage = c"vkDestroyImage",
        get_image_subresource_layout: PFN_vkGetImageSubresourceLayout = c"vkGetImageSubresourceLayout",
        create_image_view: PFN_vkCreateImageView = c"vkCreateImageView",
        destroy_image_view: PFN_vkDestroyImageView = c"vkDestroyImageView",
        create_sampler: PFN_vkCreateSampler = c"vkCreateSampler",
        destroy_sampler: PFN_vkDestroySampler = c"vkDestroySampler",

        // Pipelines
        create_shader_module: PFN_vkCreateShaderModule = c"vkCreateShaderModule",
        destroy_shader_module: PFN_vkDestroyShaderModule = c"vkDestroyShaderModule",
        create_pipeline_cache: PFN_vkCreatePipelineCache = c"vkCreatePipelineCache",
        destroy_pipeline_cache: PFN_vkDestroyPipelineCache = c"vkDestroyPipelineCache",
        get_pipeline_cache_data: PFN_vkGetPipelineCacheData = c"vkGetPipelineCacheData",
        merge_pipeline_caches: PFN_vkMergePipelineCaches = c"vkMergePipelineCaches",
        create_graphics_pipelines: PFN_vkCreateGraphicsPipelines = c"vkCreateGraphicsPipelines",
        create_compute_pipelines: PFN_vkCreateComputePipelines = c"vkCreateComputePipelines",
        destroy_pipeline: PFN_vkDestroyPipeline = c"vkDestroyPipeline",
        create_pipeline_layout: PFN_vkCreatePipelineLayout = c"vkCreatePipelineLayout",
        destroy_pipeline_layout: PFN_vkDestroyPipelineLayout = c"vkDestroyPipelineLayout",

        // Descriptors
        create_descriptor_set_layout: PFN_vkCreateDescriptorSetLayout = c"vkCreateDescriptorSetLayout",
        destroy_descriptor_set_layout: PFN_vkDestroyDescriptorSetLayout = c"vkDestroyDescriptorSetLayout",
        create_descriptor_pool: PFN_vkCreateDescriptorPool = c"vkCreateDescriptorPool",
        destroy_descriptor_pool: PFN_vkDestroyDescriptorPool = c"vkDestroyDescriptorPool",
        reset_descriptor_pool: PFN_vkResetDescriptorPool = c"vkResetDescriptorPool",
        allocate_descriptor_sets: PFN_vkAllocateDescriptorSets = c"vkAllocateDescriptorSets",
        free_descriptor_sets: PFN_vkFreeDescriptorSets = c"vkFreeDescriptorSets",
        update_descriptor_sets: PFN_vkUpdateDescriptorSets = c"vkUpdateDescriptorSets",

        // Render passes
        create_framebuffer: PFN_vkCreateFramebuffer = c"vkCreateFramebuffer",
        destroy_framebuffer: PFN_vkDestroyFramebuffer = c"vkDestroyFramebuffer",
        create_render_pass: PFN_vkCreateRenderPass = c"vkCreateRenderPass",
        destroy_render_pass: PFN_vkDestroyRenderPass = c"vkDestroyRenderPass",
        get_render_area_granularity: PFN_vkGetRenderAreaGranularity = c"vkGetRenderAreaGranularity",

        // Synchronization and queries
        create_fence: PFN_vkCreateFence = c"vkCreateFence",
        destroy_fence: PFN_vkDestroyFence = c"vkDestroyFence",
        reset_fences: PFN_vkResetFences = c"vkResetFences",
        get_fence_status: PFN_vkGetFenceStatus = c"vkGetFenceStatus",
        wait_for_fences: PFN_vkWaitForFences = c"vkWaitForFences",
        create_semaphore: PFN_vkCreateSemaphore = c"vkCreateSemaphore",
        destroy_semaphore: PFN_vkDestroySemaphore = c"vkDestroySemaphore",
        create_event: PFN_vkCreateEvent = c"vkCreateEvent",
        destroy_event: PFN_vkDestroyEvent = c"vkDestroyEvent",
        get_event_status: PFN_vkGetEventStatus = c"vkGetEventStatus",
        set_event: PFN_vkSetEvent = c"vkSetEvent",
        reset_event: PFN_vkResetEvent = c"vkResetEvent",
        create_query_pool: PFN_vkCreateQueryPool = c"vkCreateQueryPool",
        destroy_query_pool: PFN_vkDestroyQueryPool = c"vkDestroyQueryPool",
        get_query_pool_results: PFN_vkGetQueryPoolResults = c"vkGetQueryPoolResults",

        // Command pools and buffers
        create_command_pool: PFN_vkCreateCommandPool = c"vkCreateCommandPool",
        destroy_command_pool: PFN_vkDestroyCommandPool = c"vkDestroyCommandPool",
        reset_command_pool: PFN_vkResetCommandPool = c"vkResetCommandPool",
        trim_command_pool_khr: PFN_vkTrimCommandPool = c"vkTrimCommandPoolKHR",
        allocate_command_buffers: PFN_vkAllocateCommandBuffers = c"vkAllocateCommandBuffers",
        free_command_buffers: PFN_vkFreeCommandBuffers = c"vkFreeCommandBuffers",
        begin_command_buffer: PFN_vkBeginCommandBuffer = c"vkBeginCommandBuffer",
        end_command_buffer: PFN_vkEndCommandBuffer = c"vkEndCommandBuffer",
        reset_command_buffer: PFN_vkResetCommandBuffer = c"vkResetCommandBuffer",

        // Recording
        cmd_bind_pipeline: PFN_vkCmdBindPipeline = c"vkCmdBindPipeline",
        cmd_set_viewport: PFN_vkCmdSetViewport = c"vkCmdSetViewport",
        cmd_set_scissor: PFN_vkCmdSetScissor = c"vkCmdSetScissor",
        cmd_set_line_width: PFN_vkCmdSetLineWidth = c"vkCmdSetLineWidth",
        cmd_set_depth_bias: PFN_vkCmdSetDepthBias = c"vkCmdSetDepthBias",
        cmd_set_blend_constants: PFN_vkCmdSetBlendConstants = c"vkCmdSetBlendConstants",
        cmd_set_depth_bounds: PFN_vkCmdSetDepthBounds = c"vkCmdSetDepthBounds",
        cmd_set_stencil_compare_mask: PFN_vkCmdSetStencilCompareMask = c"vkCmdSetStencilCompareMask",
        cmd_set_stencil_write_mask: PFN_vkCmdSetStencilWriteMask = c"vkCmdSetStencilWriteMask",
        cmd_set_stencil_reference: PFN_vkCmdSetStencilReference = c"vkCmdSetStencilReference",
        cmd_bind_descriptor_sets: PFN_vkCmdBindDescriptorSets = c"vkCmdBindDescriptorSets",
        cmd_bind_index_buffer: PFN_vkCmdBindIndexBuffer = c"vkCmdBindIndexBuffer",
        cmd_bind_vertex_buffers: PFN_vkCmdBindVertexBuffers = c"vkCmdBindVertexBuffers",
        cmd_draw: PFN_vkCmdDraw = c"vkCmdDraw",
        cmd_draw_indexed: PFN_vkCmdDrawIndexed = c"vkCmdDrawIndexed",
        cmd_draw_indirect: PFN_vkCmdDrawIndirect = c"vkCmdDrawIndirect",
        cmd_draw_indexed_indirect: PFN_vkCmdDrawIndexedIndirect = c"vkCmdDrawIndexedIndirect",
        cmd_dispatch: PFN_vkCmdDispatch = c"vkCmdDispatch",
        cmd_dispatch_indirect: PFN_vkCmdDispatchIndirect = c"vkCmdDispatchIndirect",
        cmd_copy_buffer: PFN_vkCmdCopyBuffer = c"vkCmdCopyBuffer",
        cmd_copy_image: PFN_vkCmdCopyImage = c"vkCmdCopyImage",
        cmd_blit_image: PFN_vkCmdBlitImage = c"vkCmdBlitImage",
        cmd_copy_buffer_to_image: PFN_vkCmdCopyBufferToImage = c"vkCmdCopyBufferToImage",
        cmd_copy_image_to_buffer: PFN_vkCmdCopyImageToBuffer = c"vkCmdCopyImageToBuffer",
        cmd_update_buffer: PFN_vkCmdUpdateBuffer = c"vkCmdUpdateBuffer",
        cmd_fill_buffer: PFN_vkCmdFillBuffer = c"vkCmdFillBuffer",
        cmd_clear_color_image: PFN_vkCmdClearColorImage = c"vkCmdClearColorImage",
        cmd_clear_depth_stencil_image: PFN_vkCmdClearDepthStencilImage = c"vkCmdClearDepthStencilImage",
        cmd_clear_attachments: PFN_vkCmdClearAttachments = c"vkCmdClearAttachments",
        cmd_resolve_image: PFN_vkCmdResolveImage = c"vkCmdResolveImage",
        cmd_set_event: PFN_vkCmdSetEvent = c"vkCmdSetEvent",
        cmd_reset_event: PFN_vkCmdResetEvent = c"vkCmdResetEvent",
        cmd_wait_events: PFN_vkCmdWaitEvents = c"vkCmdWaitEvents",
        cmd_pipeline_barrier: PFN_vkCmdPipelineBarrier = c"vkCmdPipelineBarrier",
        cmd_begin_query: PFN_vkCmdBeginQuery = c"vkCmdBeginQuery",
        cmd_end_query: PFN_vkCmdEndQuery = c"vkCmdEndQuery",
        cmd_reset_query_pool: PFN_vkCmdResetQueryPool = c"vkCmdResetQueryPool",
        cmd_write_timestamp: PFN_vkCmdWriteTimestamp = c"vkCmdWriteTimestamp",
        cmd_copy_query_pool_results: PFN_vkCmdCopyQueryPoolResults = c"vkCmdCopyQueryPoolResults",
        cmd_push_constants: PFN_vkCmdPushConstants = c"vkCmdPushConstants",
        cmd_begin_render_pass: PFN_vkCmdBeginRenderPass = c"vkCmdBeginRenderPass",
        cmd_next_subpass: PFN_vkCmdNextSubpass = c"vkCmdNextSubpass",
        cmd_end_render_pass: PFN_vkCmdEndRenderPass = c"vkCmdEndRenderPass",
        cmd_execute_commands: PFN_vkCmdExecuteCommands = c"vkCmdExecuteCommands",
    }
}
