//! Instance wrapper and the global and instance-level entry points built on it.

use std::ffi::c_char;
use std::ptr;
use std::sync::Arc;

use ash::vk;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::context::{IcdContext, LiveObject};
use crate::dispatch::{dispatchable, Dispatchable, LoaderHeader};
use crate::dispatch_table::InstanceFns;
use crate::error::{check, IcdError};
use crate::ffi::{enumerate_into, query_native};
use crate::physical_device::PhysicalDevice;
use crate::extensions;

#[repr(C)]
pub struct Instance {
    header: LoaderHeader,
    handle: vk::Instance,
    fns: InstanceFns,
    context: Arc<IcdContext>,
    /// `None` until the first enumeration; `Some(empty)` when the driver
    /// reports no devices.
    physical_devices: Mutex<Option<Vec<Box<PhysicalDevice>>>>,
    _live: LiveObject,
}

dispatchable!(Instance => vk::Instance);

impl Instance {
    /// Create the native instance and wrap it.
    ///
    /// On any failure everything created so far is released before returning.
    ///
    /// # Safety
    /// `create_info` must be a valid Vulkan structure chain.
    pub unsafe fn create(context: Arc<IcdContext>, create_info: &vk::InstanceCreateInfo<'_>) -> Result<Box<Self>, IcdError> {
        log_extension_chain(create_info.p_next.cast());

        let mut instance = Box::new(Self {
            header: LoaderHeader::new(),
            handle: vk::Instance::null(),
            fns: InstanceFns::default(),
            _live: context.track(),
            physical_devices: Mutex::new(None),
            context,
        });

        let create = instance.context.native.create_instance;
        if let Err(err) = check(create(create_info, ptr::null(), &mut instance.handle)) {
            error!("failed to create native instance: {}", err);
            return Err(err);
        }

        let gipa = instance.context.native.get_instance_proc_addr;
        let native = instance.handle;
        instance.fns = InstanceFns::load(|name| unsafe { gipa(native, name.as_ptr()) });

        let missing = instance.fns.missing();
        if !missing.is_empty() {
            debug!("native instance lacks {} commands: {:?}", missing.len(), missing);
        }
        info!("created instance {:?}", native);
        Ok(instance)
    }

    pub fn native(&self) -> vk::Instance {
        self.handle
    }

    pub fn fns(&self) -> &InstanceFns {
        &self.fns
    }

    pub fn context(&self) -> &Arc<IcdContext> {
        &self.context
    }

    /// Wrapped physical device handles, enumerating natively on first use.
    ///
    /// A failed enumeration leaves nothing cached so the next call retries.
    pub fn physical_devices(&self) -> Result<Vec<vk::PhysicalDevice>, IcdError> {
        let mut cache = self.physical_devices.lock();
        if cache.is_none() {
            *cache = Some(self.wrap_physical_devices()?);
        }
        let devices = cache.as_deref().unwrap_or_default();

        let mut handles = Vec::new();
        handles.try_reserve_exact(devices.len())?;
        handles.extend(devices.iter().map(|device| device.handle()));
        Ok(handles)
    }

    fn wrap_physical_devices(&self) -> Result<Vec<Box<PhysicalDevice>>, IcdError> {
        let enumerate = self
            .fns
            .enumerate_physical_devices
            .ok_or_else(|| IcdError::missing("vkEnumeratePhysicalDevices"))?;

        let native = unsafe { query_native(|p_count, p_devices| enumerate(self.handle, p_count, p_devices)) }
            .inspect_err(|err| error!("failed to enumerate physical devices: {}", err))?;
        if native.is_empty() {
            info!("native driver reported no physical devices");
            return Ok(Vec::new());
        }

        // Dropping `wrapped` on an early return frees every wrapper built so far.
        let mut wrapped = Vec::new();
        wrapped.try_reserve_exact(native.len())?;
        for handle in native {
            wrapped.push(PhysicalDevice::wrap(self, handle)?);
        }
        debug!("wrapped {} physical devices", wrapped.len());
        Ok(wrapped)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        // Physical devices reference the native instance; release them first.
        self.physical_devices.get_mut().take();

        if self.handle == vk::Instance::null() {
            return;
        }
        match self.fns.destroy_instance.or(self.context.native.destroy_instance) {
            Some(destroy) => unsafe { destroy(self.handle, ptr::null()) },
            None => error!("vkDestroyInstance unavailable, leaking native instance {:?}", self.handle),
        }
    }
}

/// The instance extensions this driver advertises: the native list
/// filtered through the supported list.
pub fn instance_extensions(context: &IcdContext) -> Result<Vec<vk::ExtensionProperties>, IcdError> {
    let enumerate = context.native.enumerate_instance_extension_properties;
    let native = unsafe { query_native(|p_count, p_props| enumerate(ptr::null(), p_count, p_props)) }?;
    Ok(extensions::filter(&native, context.extensions.instance()))
}

fn log_extension_chain(mut next: *const vk::BaseInStructure<'_>) {
    while let Some(base) = unsafe { next.as_ref() } {
        debug!("forwarding instance create chain entry {:?}", base.s_type);
        next = base.p_next;
    }
}

// ── Entry points ────────────────────────────────────────────

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateInstance(
    p_create_info: *const vk::InstanceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    trace!("vkCreateInstance");
    let Some(context) = crate::context() else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    if p_create_info.is_null() || p_instance.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    if !p_allocator.is_null() {
        warn!("vkCreateInstance: allocation callbacks are not supported, ignoring");
    }

    match Instance::create(context, &*p_create_info) {
        Ok(instance) => {
            *p_instance = instance.into_handle();
            vk::Result::SUCCESS
        }
        Err(err) => err.into(),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroyInstance(instance: vk::Instance, p_allocator: *const vk::AllocationCallbacks<'_>) {
    trace!("vkDestroyInstance {:?}", instance);
    if !p_allocator.is_null() {
        warn!("vkDestroyInstance: allocation callbacks are not supported, ignoring");
    }
    drop(Instance::reclaim(instance));
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumerateInstanceExtensionProperties(
    p_layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    trace!("vkEnumerateInstanceExtensionProperties");
    let Some(context) = crate::context() else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    // This driver exposes no layers.
    if !p_layer_name.is_null() {
        return IcdError::LayerNotPresent.into();
    }

    match instance_extensions(&context) {
        Ok(extensions) => enumerate_into(&extensions, p_property_count, p_properties),
        Err(err) => {
            error!("failed to enumerate instance extensions: {}", err);
            err.into()
        }
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkEnumeratePhysicalDevices(
    instance: vk::Instance,
    p_physical_device_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    trace!("vkEnumeratePhysicalDevices {:?}", instance);
    let Some(instance) = Instance::from_handle(instance) else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };

    match instance.physical_devices() {
        Ok(devices) => enumerate_into(&devices, p_physical_device_count, p_physical_devices),
        Err(err) => err.into(),
    }
}
