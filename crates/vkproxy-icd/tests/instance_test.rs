//! Integration test: instance and physical device wrappers
//!
//! Drives the wrappers against the fake native driver and checks the
//! loader header, creation and teardown, leak freedom after failures, and
//! the physical device cache.
//!
//! Run with: cargo test -p vkproxy-icd --test instance_test

mod common;

use std::sync::Arc;
use std::time::Duration;

use ash::vk::{self, Handle};

use common::{create_instance, physical_device, FakeGpu, FakeVulkan};
use vkproxy_icd::dispatch::{loader_data, Dispatchable, ICD_LOADER_MAGIC};
use vkproxy_icd::instance::{self, Instance};
use vkproxy_icd::physical_device::{self as pdev, PhysicalDevice};
use vkproxy_icd::IcdError;

#[test]
fn test_create_and_destroy_instance() {
    FakeVulkan::install();
    let context = FakeVulkan::context();

    let instance = create_instance(&context);
    assert_ne!(instance.native(), vk::Instance::null());
    assert_eq!(context.live_objects(), 1);
    assert_eq!(FakeVulkan::live_objects(), 1);

    let handle = instance.into_handle();
    assert_eq!(unsafe { loader_data(handle) }, ICD_LOADER_MAGIC);

    unsafe { instance::vkDestroyInstance(handle, std::ptr::null()) };
    assert_eq!(context.live_objects(), 0);
    assert_eq!(FakeVulkan::live_objects(), 0);
    assert_eq!(FakeVulkan::calls("vkDestroyInstance"), 1);
}

#[test]
fn test_destroy_null_instance_is_noop() {
    FakeVulkan::install();
    unsafe { instance::vkDestroyInstance(vk::Instance::null(), std::ptr::null()) };
    assert_eq!(FakeVulkan::calls("vkDestroyInstance"), 0);
}

#[test]
fn test_native_create_failure_leaves_nothing() {
    FakeVulkan::install();
    let context = FakeVulkan::context();
    FakeVulkan::queue_result("vkCreateInstance", vk::Result::ERROR_INCOMPATIBLE_DRIVER);

    let create_info = vk::InstanceCreateInfo::default();
    let err = unsafe { Instance::create(context.clone(), &create_info) }.err().expect("creation must fail");

    assert!(matches!(err, IcdError::Native(vk::Result::ERROR_INCOMPATIBLE_DRIVER)));
    assert_eq!(vk::Result::from(err), vk::Result::ERROR_INCOMPATIBLE_DRIVER);
    assert_eq!(context.live_objects(), 0);
    assert_eq!(FakeVulkan::calls("vkDestroyInstance"), 0);
}

#[test]
fn test_missing_instance_commands_are_tolerated() {
    FakeVulkan::install();
    FakeVulkan::with(|fake| {
        fake.missing.insert("vkGetPhysicalDeviceProperties");
    });
    let context = FakeVulkan::context();

    let instance = create_instance(&context);
    assert!(instance.fns().get_physical_device_properties.is_none());
    assert!(instance.fns().enumerate_physical_devices.is_some());
    assert!(instance
        .fns()
        .missing()
        .iter()
        .any(|name| name.to_bytes() == b"vkGetPhysicalDeviceProperties"));

    // Forwarding through the missing entry reports nothing and does not crash.
    let pd = physical_device(&instance, 0);
    let mut props = vk::PhysicalDeviceProperties::default();
    unsafe { pdev::vkGetPhysicalDeviceProperties(pd.handle(), &mut props) };
    assert_eq!(props.vendor_id, 0);
}

#[test]
fn test_enumeration_populates_once() {
    FakeVulkan::install_with(vec![FakeGpu::default(), FakeGpu::default()]);
    let context = FakeVulkan::context();
    let instance = create_instance(&context);

    let first = instance.physical_devices().unwrap();
    let native_calls = FakeVulkan::calls("vkEnumeratePhysicalDevices");
    for _ in 0..5 {
        assert_eq!(instance.physical_devices().unwrap(), first);
    }

    assert_eq!(first.len(), 2);
    assert_eq!(FakeVulkan::calls("vkEnumeratePhysicalDevices"), native_calls);
    assert_eq!(FakeVulkan::calls("vkEnumerateDeviceExtensionProperties"), 4);
    // Instance plus two physical devices.
    assert_eq!(context.live_objects(), 3);

    for handle in &first {
        assert_eq!(unsafe { loader_data(*handle) }, ICD_LOADER_MAGIC);
    }

    drop(instance);
    assert_eq!(context.live_objects(), 0);
}

#[test]
fn test_concurrent_first_enumeration_populates_once() {
    FakeVulkan::install_with(vec![FakeGpu::default(); 3]);
    FakeVulkan::with(|fake| fake.enumerate_delay = Some(Duration::from_millis(20)));
    let context = FakeVulkan::context();
    let instance = create_instance(&context);
    let shared = FakeVulkan::shared();

    let results: Vec<Vec<vk::PhysicalDevice>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let shared = Arc::clone(&shared);
                let instance = &instance;
                scope.spawn(move || {
                    FakeVulkan::attach(shared);
                    instance.physical_devices().unwrap()
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    assert_eq!(results[0].len(), 3);
    for handles in &results[1..] {
        assert_eq!(handles, &results[0]);
    }
    // One count query and one fill: a single population.
    assert_eq!(FakeVulkan::calls("vkEnumeratePhysicalDevices"), 2);
    assert_eq!(context.live_objects(), 1 + 3);
}

#[test]
fn test_enumeration_two_call_protocol() {
    FakeVulkan::install_with(vec![FakeGpu::default(), FakeGpu::default(), FakeGpu::default()]);
    let context = FakeVulkan::context();
    let handle = create_instance(&context).into_handle();

    unsafe {
        let mut count = 0;
        let result = instance::vkEnumeratePhysicalDevices(handle, &mut count, std::ptr::null_mut());
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(count, 3);

        let mut devices = [vk::PhysicalDevice::null(); 2];
        let mut count = 2;
        let result = instance::vkEnumeratePhysicalDevices(handle, &mut count, devices.as_mut_ptr());
        assert_eq!(result, vk::Result::INCOMPLETE);
        assert_eq!(count, 2);

        let mut all = [vk::PhysicalDevice::null(); 3];
        let mut count = 3;
        let result = instance::vkEnumeratePhysicalDevices(handle, &mut count, all.as_mut_ptr());
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(&all[..2], &devices);

        // Wrapped handles map back to the native devices in native order.
        for (index, handle) in all.iter().enumerate() {
            let wrapped = PhysicalDevice::from_handle(*handle).unwrap();
            assert_eq!(FakeVulkan::physical_device_index(wrapped.native()), index);
        }

        instance::vkDestroyInstance(handle, std::ptr::null());
    }
    assert_eq!(context.live_objects(), 0);
}

#[test]
fn test_zero_devices_is_a_valid_population() {
    FakeVulkan::install_with(Vec::new());
    let context = FakeVulkan::context();
    let instance = create_instance(&context);

    assert!(instance.physical_devices().unwrap().is_empty());
    let calls = FakeVulkan::calls("vkEnumeratePhysicalDevices");
    assert!(instance.physical_devices().unwrap().is_empty());
    assert_eq!(FakeVulkan::calls("vkEnumeratePhysicalDevices"), calls);
}

#[test]
fn test_failed_population_frees_partial_wrappers_and_retries() {
    FakeVulkan::install_with(vec![FakeGpu::default(), FakeGpu::default(), FakeGpu::default()]);
    let context = FakeVulkan::context();
    let instance = create_instance(&context);

    // Two count/fill pairs succeed, the third device's count query fails.
    for _ in 0..4 {
        FakeVulkan::queue_result("vkEnumerateDeviceExtensionProperties", vk::Result::SUCCESS);
    }
    FakeVulkan::queue_result("vkEnumerateDeviceExtensionProperties", vk::Result::ERROR_OUT_OF_HOST_MEMORY);

    let err = instance.physical_devices().unwrap_err();
    assert!(matches!(err, IcdError::Native(vk::Result::ERROR_OUT_OF_HOST_MEMORY)));
    assert_eq!(context.live_objects(), 1, "only the instance may remain");

    let devices = instance.physical_devices().unwrap();
    assert_eq!(devices.len(), 3);
    assert_eq!(context.live_objects(), 4);
}

#[test]
fn test_device_extensions_are_filtered() {
    FakeVulkan::install();
    let context = FakeVulkan::context();
    let instance = create_instance(&context);
    let pd = physical_device(&instance, 0);

    unsafe {
        let mut count = 0;
        let result = pdev::vkEnumerateDeviceExtensionProperties(pd.handle(), std::ptr::null(), &mut count, std::ptr::null_mut());
        assert_eq!(result, vk::Result::SUCCESS);
        // The fake reports maintenance1, swapchain and bind_memory2.
        assert_eq!(count, 2);

        let mut props = vec![vk::ExtensionProperties::default(); count as usize];
        let result = pdev::vkEnumerateDeviceExtensionProperties(pd.handle(), std::ptr::null(), &mut count, props.as_mut_ptr());
        assert_eq!(result, vk::Result::SUCCESS);
        let names: Vec<_> = props
            .iter()
            .map(|p| vkproxy_icd::extensions::extension_name(p).unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["VK_KHR_maintenance1", "VK_KHR_bind_memory2"]);
        assert_eq!(props[0].spec_version, 2);

        let layer = c"VK_LAYER_KHRONOS_validation";
        let result = pdev::vkEnumerateDeviceExtensionProperties(pd.handle(), layer.as_ptr(), &mut count, props.as_mut_ptr());
        assert_eq!(result, vk::Result::ERROR_LAYER_NOT_PRESENT);
    }
}

#[test]
fn test_disabled_extension_is_hidden() {
    FakeVulkan::install();
    let policy = vkproxy_icd::extensions::ExtensionPolicy::new(&["VK_KHR_bind_memory2".to_string()]);
    let context = FakeVulkan::context_with(policy);
    let instance = create_instance(&context);
    let pd = physical_device(&instance, 0);

    assert_eq!(pd.extensions().len(), 1);
}

#[test]
fn test_physical_device_thunk_forwards_native_handle() {
    FakeVulkan::install_with(vec![FakeGpu::default(), FakeGpu::default()]);
    let context = FakeVulkan::context();
    let instance = create_instance(&context);
    let second = physical_device(&instance, 1);

    let mut props = vk::PhysicalDeviceProperties::default();
    unsafe { pdev::vkGetPhysicalDeviceProperties(second.handle(), &mut props) };
    assert_eq!(props.device_id, 1);
    assert_eq!(props.device_type, vk::PhysicalDeviceType::VIRTUAL_GPU);
    assert_ne!(second.handle().as_raw(), second.native().as_raw());
}
