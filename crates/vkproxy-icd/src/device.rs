//! Device and queue wrappers.

use std::ffi::{c_char, CStr};
use std::ptr;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info, trace, warn};

use crate::context::{IcdContext, LiveObject};
use crate::dispatch::{dispatchable, Dispatchable, LoaderHeader};
use crate::dispatch_table::DeviceFns;
use crate::error::{check, IcdError};
use crate::ffi::raw_slice;
use crate::physical_device::PhysicalDevice;
use crate::thunk::{thunks, Unwrap};

#[repr(C)]
pub struct Device {
    header: LoaderHeader,
    handle: vk::Device,
    fns: DeviceFns,
    /// Wrapped handle of the physical device this device was created from.
    physical_device: vk::PhysicalDevice,
    /// Indexed by queue family, then queue index. Families the application
    /// did not request stay empty.
    queues: Vec<Vec<Box<Queue>>>,
    context: Arc<IcdContext>,
    _live: LiveObject,
}

dispatchable!(Device => vk::Device);

#[repr(C)]
pub struct Queue {
    header: LoaderHeader,
    handle: vk::Queue,
    /// Wrapped handle of the owning device.
    device: vk::Device,
    _live: LiveObject,
}

dispatchable!(Queue => vk::Queue);

impl Device {
    /// Create the native device, load its table and wrap every requested queue.
    ///
    /// A queue family index outside the native family count fails the whole
    /// call; the native device is destroyed before returning.
    ///
    /// # Safety
    /// `create_info` must be a valid Vulkan structure chain.
    pub unsafe fn create(physical_device: &PhysicalDevice, create_info: &vk::DeviceCreateInfo<'_>) -> Result<Box<Self>, IcdError> {
        let instance = physical_device
            .instance()
            .ok_or_else(|| IcdError::InitializationFailed("physical device has no instance".into()))?;
        let context = Arc::clone(instance.context());

        let create = instance
            .fns()
            .create_device
            .ok_or_else(|| IcdError::missing("vkCreateDevice"))?;
        // Checked before creating anything so a native device is never
        // created without a way to destroy it.
        let gdpa = instance
            .fns()
            .get_device_proc_addr
            .or(context.native.get_device_proc_addr)
            .ok_or_else(|| IcdError::missing("vkGetDeviceProcAddr"))?;
        let family_count = physical_device.queue_family_count()?;

        let mut device = Box::new(Self {
            header: LoaderHeader::new(),
            handle: vk::Device::null(),
            fns: DeviceFns::default(),
            physical_device: physical_device.handle(),
            queues: Vec::new(),
            _live: context.track(),
            context,
        });

        if let Err(err) = check(create(physical_device.native(), create_info, ptr::null(), &mut device.handle)) {
            error!("failed to create native device: {}", err);
            return Err(err);
        }

        let native = device.handle;
        device.fns = DeviceFns::load(|name: &CStr| unsafe { gdpa(native, name.as_ptr()) });
        let missing = device.fns.missing();
        if !missing.is_empty() {
            debug!("native device lacks {} commands: {:?}", missing.len(), missing);
        }

        device.queues.try_reserve_exact(family_count as usize)?;
        device.queues.resize_with(family_count as usize, Vec::new);

        let queue_infos = raw_slice(create_info.p_queue_create_infos, create_info.queue_create_info_count);
        for info in queue_infos {
            let family = info.queue_family_index;
            if family >= family_count {
                error!(
                    "queue family index {} requested but device has {} families",
                    family, family_count
                );
                return Err(IcdError::InvalidQueueFamily {
                    index: family,
                    count: family_count,
                });
            }
            let queues = device.wrap_queues(family, info.queue_count)?;
            device.queues[family as usize] = queues;
        }

        info!("created device {:?} with {} queue families", native, family_count);
        Ok(device)
    }

    fn wrap_queues(&self, family: u32, count: u32) -> Result<Vec<Box<Queue>>, IcdError> {
        let get_queue = self
            .fns
            .get_device_queue
            .ok_or_else(|| IcdError::missing("vkGetDeviceQueue"))?;

        let mut queues = Vec::new();
        queues.try_reserve_exact(count as usize)?;
        for index in 0..count {
            let mut native = vk::Queue::null();
            unsafe { get_queue(self.handle, family, index, &mut native) };
            queues.push(Box::new(Queue {
                header: LoaderHeader::new(),
                handle: native,
                device: self.handle(),
                _live: self.context.track(),
            }));
        }
        Ok(queues)
    }

    pub fn native(&self) -> vk::Device {
        self.handle
    }

    pub fn fns(&self) -> &DeviceFns {
        &self.fns
    }

    pub fn context(&self) -> &Arc<IcdContext> {
        &self.context
    }

    pub fn physical_device(&self) -> Option<&PhysicalDevice> {
        unsafe { PhysicalDevice::from_handle(self.physical_device) }
    }

    /// Number of queues wrapped for `family`; zero for families not requested.
    pub fn queue_count(&self, family: u32) -> u32 {
        self.queues.get(family as usize).map_or(0, |queues| queues.len() as u32)
    }

    /// Wrapped queue handle, or `None` when out of range.
    pub fn queue(&self, family: u32, index: u32) -> Option<vk::Queue> {
        self.queues
            .get(family as usize)?
            .get(index as usize)
            .map(|queue| queue.handle())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.queues.clear();

        if self.handle == vk::Device::null() {
            return;
        }
        match self.fns.destroy_device {
            Some(destroy) => unsafe { destroy(self.handle, ptr::null()) },
            None => error!("vkDestroyDevice unavailable, leaking native device {:?}", self.handle),
        }
    }
}

impl Queue {
    pub fn native(&self) -> vk::Queue {
        self.handle
    }

    pub fn device(&self) -> Option<&Device> {
        unsafe { Device::from_handle(self.device) }
    }
}

impl Unwrap for vk::Device {
    type Native = vk::Device;
    type Table = DeviceFns;

    unsafe fn unwrap_native<'a>(self) -> Option<(vk::Device, &'a DeviceFns)> {
        let device: &'a Device = Device::from_handle(self)?;
        Some((device.handle, &device.fns))
    }
}

impl Unwrap for vk::Queue {
    type Native = vk::Queue;
    type Table = DeviceFns;

    unsafe fn unwrap_native<'a>(self) -> Option<(vk::Queue, &'a DeviceFns)> {
        let queue: &'a Queue = Queue::from_handle(self)?;
        let device: &'a Device = Device::from_handle(queue.device)?;
        Some((queue.handle, &device.fns))
    }
}

// ── Entry points ────────────────────────────────────────────

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkCreateDevice(
    physical_device: vk::PhysicalDevice,
    p_create_info: *const vk::DeviceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    trace!("vkCreateDevice {:?}", physical_device);
    let Some(physical_device) = PhysicalDevice::from_handle(physical_device) else {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    if p_create_info.is_null() || p_device.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    if !p_allocator.is_null() {
        warn!("vkCreateDevice: allocation callbacks are not supported, ignoring");
    }

    match Device::create(physical_device, &*p_create_info) {
        Ok(device) => {
            *p_device = device.into_handle();
            vk::Result::SUCCESS
        }
        Err(err) => err.into(),
    }
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkDestroyDevice(device: vk::Device, p_allocator: *const vk::AllocationCallbacks<'_>) {
    trace!("vkDestroyDevice {:?}", device);
    if !p_allocator.is_null() {
        warn!("vkDestroyDevice: allocation callbacks are not supported, ignoring");
    }
    drop(Device::reclaim(device));
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkGetDeviceQueue(
    device: vk::Device,
    queue_family_index: u32,
    queue_index: u32,
    p_queue: *mut vk::Queue,
) {
    trace!("vkGetDeviceQueue {:?} family={} index={}", device, queue_family_index, queue_index);
    if p_queue.is_null() {
        return;
    }
    let queue = Device::from_handle(device).and_then(|device| device.queue(queue_family_index, queue_index));
    *p_queue = queue.unwrap_or_else(vk::Queue::null);
}

#[allow(non_snake_case)]
pub unsafe extern "system" fn vkGetDeviceProcAddr(device: vk::Device, p_name: *const c_char) -> vk::PFN_vkVoidFunction {
    if p_name.is_null() {
        return None;
    }
    let name = CStr::from_ptr(p_name).to_str().ok()?;
    trace!("vkGetDeviceProcAddr {:?} {}", device, name);

    let found = crate::proc_table::device_proc(name);
    if found.is_none() {
        debug!("unsupported device function {}", name);
    }
    found
}

thunks! {
    fn vkDeviceWaitIdle(device: vk::Device) -> vk::Result => device_wait_idle;
    fn vkQueueWaitIdle(queue: vk::Queue) -> vk::Result => queue_wait_idle;
    fn vkQueueBindSparse(queue: vk::Queue, bind_info_count: u32, p_bind_info: *const vk::BindSparseInfo<'_>, fence: vk::Fence) -> vk::Result => queue_bind_sparse;
}
