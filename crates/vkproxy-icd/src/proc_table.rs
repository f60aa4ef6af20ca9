//! Name to entry point routing.
//!
//! Three tables exist. The global table holds the commands callable without
//! an instance. Instance and device tables hold everything else; with a
//! non-null instance a name is tried against the instance table first and
//! the device table second.

use ash::vk;
use tracing::debug;

use crate::{command, descriptor, device, image, instance, memory, physical_device, pipeline, renderpass, sync};

/// Cast an entry point to the untyped pointer the loader expects.
macro_rules! proc_fn {
    ($f:path) => {
        Some(unsafe { std::mem::transmute::<*const (), unsafe extern "system" fn()>($f as *const ()) })
    };
}
pub(crate) use proc_fn;

/// Commands callable with a null instance.
pub fn global_proc(name: &str) -> vk::PFN_vkVoidFunction {
    match name {
        "vkCreateInstance" => proc_fn!(instance::vkCreateInstance),
        "vkEnumerateInstanceExtensionProperties" => proc_fn!(instance::vkEnumerateInstanceExtensionProperties),
        "vkGetInstanceProcAddr" => proc_fn!(crate::vkGetInstanceProcAddr),
        _ => None,
    }
}

/// Commands dispatched on an instance or physical device.
pub fn instance_proc(name: &str) -> vk::PFN_vkVoidFunction {
    let custom = match name {
        "vkDestroyInstance" => proc_fn!(instance::vkDestroyInstance),
        "vkEnumeratePhysicalDevices" => proc_fn!(instance::vkEnumeratePhysicalDevices),
        "vkEnumerateDeviceExtensionProperties" => proc_fn!(physical_device::vkEnumerateDeviceExtensionProperties),
        "vkEnumerateDeviceLayerProperties" => proc_fn!(physical_device::vkEnumerateDeviceLayerProperties),
        "vkCreateDevice" => proc_fn!(device::vkCreateDevice),
        _ => None,
    };
    custom.or_else(|| physical_device::lookup(name))
}

/// Commands dispatched on a device, queue or command buffer.
pub fn device_proc(name: &str) -> vk::PFN_vkVoidFunction {
    let custom = match name {
        "vkGetDeviceProcAddr" => proc_fn!(device::vkGetDeviceProcAddr),
        "vkDestroyDevice" => proc_fn!(device::vkDestroyDevice),
        "vkGetDeviceQueue" => proc_fn!(device::vkGetDeviceQueue),
        "vkAllocateCommandBuffers" => proc_fn!(command::vkAllocateCommandBuffers),
        "vkFreeCommandBuffers" => proc_fn!(command::vkFreeCommandBuffers),
        "vkCmdExecuteCommands" => proc_fn!(command::vkCmdExecuteCommands),
        "vkQueueSubmit" => proc_fn!(sync::vkQueueSubmit),
        _ => None,
    };
    custom
        .or_else(|| device::lookup(name))
        .or_else(|| command::lookup(name))
        .or_else(|| sync::lookup(name))
        .or_else(|| memory::lookup(name))
        .or_else(|| image::lookup(name))
        .or_else(|| pipeline::lookup(name))
        .or_else(|| renderpass::lookup(name))
        .or_else(|| descriptor::lookup(name))
}

/// Resolve `name` the way `vkGetInstanceProcAddr` does.
pub fn resolve(instance: vk::Instance, name: &str) -> vk::PFN_vkVoidFunction {
    if let Some(f) = global_proc(name) {
        return Some(f);
    }

    if instance == vk::Instance::null() {
        debug!("global function {} not found", name);
        return None;
    }

    let found = instance_proc(name).or_else(|| device_proc(name));
    if found.is_none() {
        debug!("unsupported device or instance function {}", name);
    }
    found
}
