//! Physical device wrapper and physical-device-level commands.

use std::ffi::c_char;
use std::ptr;

use ash::vk;
use tracing::{debug, trace};

use crate::context::LiveObject;
use crate::dispatch::{dispatchable, Dispatchable, LoaderHeader};
use crate::dispatch_table::InstanceFns;
use crate::error::IcdError;
use crate::extensions;
use crate::ffi::{enumerate_into, query_native};
use crate::instance::Instance;
use crate::thunk::{thunks, Unwrap};

#[repr(C)]
pub struct PhysicalDevice {
    header: LoaderHeader,
    handle: vk::PhysicalDevice,
    /// Wrapped handle of the owning instance.
    instance: vk::Instance,
    /// Native device extensions that survived filtering.
    extensions: Vec<vk::ExtensionProperties>,
    _live: LiveObject,
}

dispatchable!(PhysicalDevice => vk::PhysicalDevice);

impl PhysicalDevice {
    /// Wrap a native physical device, capturing its filtered extension list.
    pub(crate) fn wrap(instance: &Instance, handle: vk::PhysicalDevice) -> Result<Box<Self>, IcdError> {
        let enumerate = instance
            .fns()
            .enumerate_device_extension_properties
            .ok_or_else(|| IcdError::missing("vkEnumerateDeviceExtensionProperties"))?;

        let native = unsafe { query_native(|p_count, p_props| enumerate(handle, ptr::null(), p_count, p_props)) }?;
        let extensions = extensions::filter(&native, instance.context().extensions.device());
        debug!(
            "physical device {:?}: {} of {} native extensions advertised",
            handle,
            extensions.len(),
            native.len()
        );

        Ok(Box::new(Self {
            header: LoaderHeader::new(),
            handle,
            instance: instance.handle(),
            extensions,
            _live: instance.context().track(),
        }))
    }

    pub fn native(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn extensions(&self) -> &[vk::ExtensionProperties] {
        &self.extensions
    }

    pub fn instance(&self) -> Option<&Instance> {
        unsafe { Instance::from_handle(self.instance) }
    }

    /// Number of queue families the native device exposes.
    pub fn queue_family_count(&self) -> Result<u32, IcdError> {
        let instance = self
            .instance()
            .ok_or_else(|| IcdError::InitializationFailed("physical device has no instance".into()))?;
        let query = instance
            .fns()
            .get_physical_device_queue_family_properties
            .ok_or_else(|| IcdError::missing("vkGetPhysicalDeviceQueueFamilyProperties"))?;

        let mut count = 0u32;
        unsafe { query(self.handle, &mut count, ptr::null_mut()) };
        Ok(count)
    }
}

impl Unwrap for vk::PhysicalDevice {
    type Native = vk::PhysicalDevice;
    type Table = InstanceFns;

    unsafe fn unwrap_native<'a>(self) -> Option<(vk::PhysicalDevice, &'a InstanceFns)> {
        let physical_device = PhysicalDevice::from_handle(self)?;
        let instance: &'a Instance = Instance::from_handle(physical_device.instance)?;
        Some((physical_device.handle, instance.fns()))
    }
}

// ── Entry points ────────────────────────────────────────────

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateDeviceExtensionProperties(
    physical_device: vk::PhysicalDevice,
    p_layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    trace!("vkEnumerateDeviceExtensionProperties {:?}", physical_device);
    // This driver exposes no layers.
    if !p_layer_name.is_null() {
        return IcdError::LayerNotPresent.into();
    }
    let Some(physical_device) = PhysicalDevice::from_handle(physical_device) else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    enumerate_into(physical_device.extensions(), p_property_count, p_properties)
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateDeviceLayerProperties(
    _physical_device: vk::PhysicalDevice,
    p_property_count: *mut u32,
    _p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    if !p_property_count.is_null() {
        *p_property_count = 0;
    }
    vk::Result::SUCCESS
}

thunks! {
    fn vkGetPhysicalDeviceFeatures(physical_device: vk::PhysicalDevice, p_features: *mut vk::PhysicalDeviceFeatures) => get_physical_device_features;
    fn vkGetPhysicalDeviceFormatProperties(physical_device: vk::PhysicalDevice, format: vk::Format, p_format_properties: *mut vk::FormatProperties) => get_physical_device_format_properties;
    fn vkGetPhysicalDeviceImageFormatProperties(
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
        ty: vk::ImageType,
        tiling: vk::ImageTiling,
        usage: vk::ImageUsageFlags,
        flags: vk::ImageCreateFlags,
        p_image_format_properties: *mut vk::ImageFormatProperties,
    ) -> vk::Result => get_physical_device_image_format_properties;
    fn vkGetPhysicalDeviceMemoryProperties(physical_device: vk::PhysicalDevice, p_memory_properties: *mut vk::PhysicalDeviceMemoryProperties) => get_physical_device_memory_properties;
    fn vkGetPhysicalDeviceProperties(physical_device: vk::PhysicalDevice, p_properties: *mut vk::PhysicalDeviceProperties) => get_physical_device_properties;
    fn vkGetPhysicalDeviceQueueFamilyProperties(
        physical_device: vk::PhysicalDevice,
        p_queue_family_property_count: *mut u32,
        p_queue_family_properties: *mut vk::QueueFamilyProperties,
    ) => get_physical_device_queue_family_properties;
    fn vkGetPhysicalDeviceSparseImageFormatProperties(
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
        ty: vk::ImageType,
        samples: vk::SampleCountFlags,
        usage: vk::ImageUsageFlags,
        tiling: vk::ImageTiling,
        p_property_count: *mut u32,
        p_properties: *mut vk::SparseImageFormatProperties,
    ) => get_physical_device_sparse_image_format_properties;

    fn vkGetPhysicalDeviceFeatures2KHR(physical_device: vk::PhysicalDevice, p_features: *mut vk::PhysicalDeviceFeatures2<'_>) => get_physical_device_features2_khr;
    fn vkGetPhysicalDeviceFormatProperties2KHR(physical_device: vk::PhysicalDevice, format: vk::Format, p_format_properties: *mut vk::FormatProperties2<'_>) => get_physical_device_format_properties2_khr;
    fn vkGetPhysicalDeviceImageFormatProperties2KHR(
        physical_device: vk::PhysicalDevice,
        p_image_format_info: *const vk::PhysicalDeviceImageFormatInfo2<'_>,
        p_image_format_properties: *mut vk::ImageFormatProperties2<'_>,
    ) -> vk::Result => get_physical_device_image_format_properties2_khr;
    fn vkGetPhysicalDeviceMemoryProperties2KHR(physical_device: vk::PhysicalDevice, p_memory_properties: *mut vk::PhysicalDeviceMemoryProperties2<'_>) => get_physical_device_memory_properties2_khr;
    fn vkGetPhysicalDeviceProperties2KHR(physical_device: vk::PhysicalDevice, p_properties: *mut vk::PhysicalDeviceProperties2<'_>) => get_physical_device_properties2_khr;
    fn vkGetPhysicalDeviceQueueFamilyProperties2KHR(
        physical_device: vk::PhysicalDevice,
        p_queue_family_property_count: *mut u32,
        p_queue_family_properties: *mut vk::QueueFamilyProperties2<'_>,
    ) => get_physical_device_queue_family_properties2_khr;
    fn vkGetPhysicalDeviceSparseImageFormatProperties2KHR(
        physical_device: vk::PhysicalDevice,
        p_format_info: *const vk::PhysicalDeviceSparseImageFormatInfo2<'_>,
        p_property_count: *mut u32,
        p_properties: *mut vk::SparseImageFormatProperties2<'_>,
    ) => get_physical_device_sparse_image_format_properties2_khr;
}
