#![allow(dead_code)]

pub mod fake_driver;

use std::sync::Arc;

use ash::vk;

use vkproxy_icd::device::Device;
use vkproxy_icd::dispatch::Dispatchable;
use vkproxy_icd::instance::Instance;
use vkproxy_icd::physical_device::PhysicalDevice;
use vkproxy_icd::{IcdContext, IcdError};

#[allow(unused_imports)]
pub use fake_driver::{FakeGpu, FakeVulkan};

pub fn create_instance(context: &Arc<IcdContext>) -> Box<Instance> {
    let app_info = vk::ApplicationInfo::default().api_version(vk::API_VERSION_1_0);
    let create_info = vk::InstanceCreateInfo::default().application_info(&app_info);
    unsafe { Instance::create(Arc::clone(context), &create_info) }.expect("instance creation")
}

pub fn physical_device(instance: &Instance, index: usize) -> &PhysicalDevice {
    let handles = instance.physical_devices().expect("physical device enumeration");
    unsafe { PhysicalDevice::from_handle(handles[index]) }.expect("wrapped physical device")
}

/// Create a device requesting `(family, queue count)` pairs.
pub fn create_device(physical_device: &PhysicalDevice, queues: &[(u32, u32)]) -> Result<Box<Device>, IcdError> {
    let priorities: Vec<Vec<f32>> = queues.iter().map(|&(_, count)| vec![1.0; count as usize]).collect();
    let queue_infos: Vec<_> = queues
        .iter()
        .zip(&priorities)
        .map(|(&(family, _), priorities)| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(priorities)
        })
        .collect();
    let create_info = vk::DeviceCreateInfo::default().queue_create_infos(&queue_infos);
    unsafe { Device::create(physical_device, &create_info) }
}
