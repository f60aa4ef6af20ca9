//! A fake native Vulkan driver that tests can script.
//!
//! Each thread sees its own driver, so tests running in parallel do not
//! interfere. A test that drives one instance from several threads hands
//! its driver to them with `shared` and `attach`. Every fake command counts
//! its calls, and any command can be told to fail on its next calls with
//! `queue_result`.

use std::cell::RefCell;
use std::cmp::min;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::{c_char, CStr};
use std::sync::Arc;
use std::time::Duration;

use ash::vk::{self, Handle};
use parking_lot::Mutex;

use vkproxy_icd::extensions::ExtensionPolicy;
use vkproxy_icd::native::NativeDriver;
use vkproxy_icd::IcdContext;

const PHYSICAL_DEVICE_BASE: u64 = 0x1000;
const QUEUE_BASE: u64 = 0x2000_0000;

/// One fake GPU.
#[derive(Debug, Clone)]
pub struct FakeGpu {
    pub extensions: Vec<(&'static str, u32)>,
    pub queue_families: u32,
}

impl Default for FakeGpu {
    fn default() -> Self {
        Self {
            extensions: vec![("VK_KHR_maintenance1", 2), ("VK_KHR_swapchain", 70), ("VK_KHR_bind_memory2", 1)],
            queue_families: 3,
        }
    }
}

#[derive(Default)]
pub struct FakeVulkan {
    pub gpus: Vec<FakeGpu>,
    pub instance_extensions: Vec<(&'static str, u32)>,
    /// Commands the proc-addr functions pretend not to know.
    pub missing: HashSet<&'static str>,
    results: HashMap<&'static str, VecDeque<vk::Result>>,
    calls: HashMap<&'static str, usize>,
    live: HashSet<u64>,
    next_handle: u64,
    /// Command buffer counts requested by each native allocation.
    pub allocate_counts: Vec<u32>,
    /// Native command buffers freed, in order.
    pub freed_command_buffers: Vec<u64>,
    /// Native command buffers of each submit info of the last submit.
    pub last_submit: Vec<Vec<u64>>,
    /// Secondary buffers of the last execute-commands call.
    pub last_execute: Vec<u64>,
    /// (native command buffer, vertex count) per draw.
    pub draws: Vec<(u64, u32)>,
    /// Whether each create/destroy fence call received an allocator.
    pub fence_allocators: Vec<bool>,
    /// Sleep inside vkEnumeratePhysicalDevices, outside the driver lock.
    pub enumerate_delay: Option<Duration>,
    /// Context whose live count is sampled on every queue submit.
    pub watched_context: Option<Arc<IcdContext>>,
    /// Live count of `watched_context` while each submit was in the driver.
    pub live_during_submit: Vec<usize>,
}

/// A driver state that several threads can attach to.
pub type SharedFake = Arc<Mutex<FakeVulkan>>;

thread_local! {
    static CURRENT: RefCell<SharedFake> = RefCell::new(SharedFake::default());
}

impl FakeVulkan {
    /// Reset this thread's driver to one GPU and the usual instance extensions.
    pub fn install() {
        Self::install_with(vec![FakeGpu::default()]);
    }

    pub fn install_with(gpus: Vec<FakeGpu>) {
        let fake = FakeVulkan {
            gpus,
            instance_extensions: vec![("VK_KHR_get_physical_device_properties2", 2), ("VK_KHR_surface", 25)],
            next_handle: 0x10_0000,
            ..Default::default()
        };
        Self::attach(Arc::new(Mutex::new(fake)));
    }

    /// This thread's driver, for handing to other threads.
    pub fn shared() -> SharedFake {
        CURRENT.with(|current| Arc::clone(&current.borrow()))
    }

    /// Make this thread use `fake` as its driver.
    pub fn attach(fake: SharedFake) {
        CURRENT.with(|current| *current.borrow_mut() = fake);
    }

    pub fn with<R>(f: impl FnOnce(&mut FakeVulkan) -> R) -> R {
        let fake = Self::shared();
        let mut guard = fake.lock();
        f(&mut guard)
    }

    /// Queue a result for the next call of `name`. Calls revert to
    /// `SUCCESS` once the queue is drained.
    pub fn queue_result(name: &'static str, result: vk::Result) {
        Self::with(|fake| fake.results.entry(name).or_default().push_back(result));
    }

    pub fn calls(name: &str) -> usize {
        Self::with(|fake| fake.calls.get(name).copied().unwrap_or(0))
    }

    /// Native instances, devices and command buffers not yet destroyed.
    pub fn live_objects() -> usize {
        Self::with(|fake| fake.live.len())
    }

    /// A driver context bound to this fake.
    pub fn context() -> Arc<IcdContext> {
        Self::context_with(ExtensionPolicy::default())
    }

    pub fn context_with(extensions: ExtensionPolicy) -> Arc<IcdContext> {
        let native = unsafe { NativeDriver::from_get_instance_proc_addr(get_instance_proc_addr) }
            .expect("fake driver exports the global commands");
        IcdContext::new(native, extensions)
    }

    pub fn physical_device_index(handle: vk::PhysicalDevice) -> usize {
        (handle.as_raw() - PHYSICAL_DEVICE_BASE) as usize
    }

    pub fn queue_handle(family: u32, index: u32) -> vk::Queue {
        vk::Queue::from_raw(QUEUE_BASE + u64::from(family) * 0x100 + u64::from(index))
    }

    fn next_result(&mut self, name: &'static str) -> vk::Result {
        *self.calls.entry(name).or_default() += 1;
        self.results
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(vk::Result::SUCCESS)
    }

    fn count(&mut self, name: &'static str) {
        *self.calls.entry(name).or_default() += 1;
    }

    fn new_handle(&mut self) -> u64 {
        self.next_handle += 0x10;
        self.live.insert(self.next_handle);
        self.next_handle
    }

    fn release(&mut self, raw: u64) {
        assert!(self.live.remove(&raw), "native object {:#x} released twice or never created", raw);
    }
}

pub fn extension(name: &str, spec_version: u32) -> vk::ExtensionProperties {
    let mut props = vk::ExtensionProperties {
        spec_version,
        ..Default::default()
    };
    for (dst, src) in props.extension_name.iter_mut().zip(name.bytes()) {
        *dst = src as c_char;
    }
    props
}

unsafe fn copy_with_count<T: Copy>(values: &[T], p_count: *mut u32, p_values: *mut T) -> vk::Result {
    if p_values.is_null() {
        *p_count = values.len() as u32;
        return vk::Result::SUCCESS;
    }
    let count = min(*p_count as usize, values.len());
    std::ptr::copy_nonoverlapping(values.as_ptr(), p_values, count);
    *p_count = count as u32;
    if count < values.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

macro_rules! entry {
    ($f:expr) => {
        Some(unsafe { std::mem::transmute::<*const (), unsafe extern "system" fn()>($f as *const ()) })
    };
}

fn function(name: &str) -> vk::PFN_vkVoidFunction {
    if FakeVulkan::with(|fake| fake.missing.contains(name)) {
        return None;
    }
    match name {
        "vkCreateInstance" => entry!(create_instance),
        "vkDestroyInstance" => entry!(destroy_instance),
        "vkEnumerateInstanceExtensionProperties" => entry!(enumerate_instance_extension_properties),
        "vkEnumeratePhysicalDevices" => entry!(enumerate_physical_devices),
        "vkEnumerateDeviceExtensionProperties" => entry!(enumerate_device_extension_properties),
        "vkGetPhysicalDeviceProperties" => entry!(get_physical_device_properties),
        "vkGetPhysicalDeviceQueueFamilyProperties" => entry!(get_physical_device_queue_family_properties),
        "vkCreateDevice" => entry!(create_device),
        "vkGetDeviceProcAddr" => entry!(get_device_proc_addr),
        "vkDestroyDevice" => entry!(destroy_device),
        "vkGetDeviceQueue" => entry!(get_device_queue),
        "vkDeviceWaitIdle" => entry!(device_wait_idle),
        "vkAllocateCommandBuffers" => entry!(allocate_command_buffers),
        "vkFreeCommandBuffers" => entry!(free_command_buffers),
        "vkQueueSubmit" => entry!(queue_submit),
        "vkCmdExecuteCommands" => entry!(cmd_execute_commands),
        "vkCmdDraw" => entry!(cmd_draw),
        "vkCreateFence" => entry!(create_fence),
        "vkDestroyFence" => entry!(destroy_fence),
        _ => None,
    }
}

pub unsafe extern "system" fn get_instance_proc_addr(_instance: vk::Instance, p_name: *const c_char) -> vk::PFN_vkVoidFunction {
    function(CStr::from_ptr(p_name).to_str().ok()?)
}

unsafe extern "system" fn get_device_proc_addr(_device: vk::Device, p_name: *const c_char) -> vk::PFN_vkVoidFunction {
    function(CStr::from_ptr(p_name).to_str().ok()?)
}

unsafe extern "system" fn create_instance(
    _p_create_info: *const vk::InstanceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    FakeVulkan::with(|fake| {
        let result = fake.next_result("vkCreateInstance");
        if result == vk::Result::SUCCESS {
            *p_instance = vk::Instance::from_raw(fake.new_handle());
        }
        result
    })
}

unsafe extern "system" fn destroy_instance(instance: vk::Instance, _p_allocator: *const vk::AllocationCallbacks<'_>) {
    FakeVulkan::with(|fake| {
        fake.count("vkDestroyInstance");
        fake.release(instance.as_raw());
    })
}

unsafe extern "system" fn enumerate_instance_extension_properties(
    _p_layer_name: *const c_char,
    p_count: *mut u32,
    p_props: *mut vk::ExtensionProperties,
) -> vk::Result {
    FakeVulkan::with(|fake| {
        let result = fake.next_result("vkEnumerateInstanceExtensionProperties");
        if result != vk::Result::SUCCESS {
            return result;
        }
        let props: Vec<_> = fake.instance_extensions.iter().map(|&(n, v)| extension(n, v)).collect();
        copy_with_count(&props, p_count, p_props)
    })
}

unsafe extern "system" fn enumerate_physical_devices(
    _instance: vk::Instance,
    p_count: *mut u32,
    p_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    if let Some(delay) = FakeVulkan::with(|fake| fake.enumerate_delay) {
        std::thread::sleep(delay);
    }
    FakeVulkan::with(|fake| {
        let result = fake.next_result("vkEnumeratePhysicalDevices");
        if result != vk::Result::SUCCESS {
            return result;
        }
        let handles: Vec<_> = (0..fake.gpus.len() as u64)
            .map(|i| vk::PhysicalDevice::from_raw(PHYSICAL_DEVICE_BASE + i))
            .collect();
        copy_with_count(&handles, p_count, p_devices)
    })
}

unsafe extern "system" fn enumerate_device_extension_properties(
    physical_device: vk::PhysicalDevice,
    _p_layer_name: *const c_char,
    p_count: *mut u32,
    p_props: *mut vk::ExtensionProperties,
) -> vk::Result {
    FakeVulkan::with(|fake| {
        let result = fake.next_result("vkEnumerateDeviceExtensionProperties");
        if result != vk::Result::SUCCESS {
            return result;
        }
        let gpu = &fake.gpus[FakeVulkan::physical_device_index(physical_device)];
        let props: Vec<_> = gpu.extensions.iter().map(|&(n, v)| extension(n, v)).collect();
        copy_with_count(&props, p_count, p_props)
    })
}

unsafe extern "system" fn get_physical_device_properties(
    physical_device: vk::PhysicalDevice,
    p_properties: *mut vk::PhysicalDeviceProperties,
) {
    FakeVulkan::with(|fake| fake.count("vkGetPhysicalDeviceProperties"));
    let props = &mut *p_properties;
    props.device_id = FakeVulkan::physical_device_index(physical_device) as u32;
    props.vendor_id = 0xfa4e;
    props.device_type = vk::PhysicalDeviceType::VIRTUAL_GPU;
}

unsafe extern "system" fn get_physical_device_queue_family_properties(
    physical_device: vk::PhysicalDevice,
    p_count: *mut u32,
    p_props: *mut vk::QueueFamilyProperties,
) {
    FakeVulkan::with(|fake| {
        fake.count("vkGetPhysicalDeviceQueueFamilyProperties");
        let families = fake.gpus[FakeVulkan::physical_device_index(physical_device)].queue_families;
        let props = vec![
            vk::QueueFamilyProperties {
                queue_flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                queue_count: 4,
                ..Default::default()
            };
            families as usize
        ];
        let _ = copy_with_count(&props, p_count, p_props);
    })
}

unsafe extern "system" fn create_device(
    _physical_device: vk::PhysicalDevice,
    _p_create_info: *const vk::DeviceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    FakeVulkan::with(|fake| {
        let result = fake.next_result("vkCreateDevice");
        if result == vk::Result::SUCCESS {
            *p_device = vk::Device::from_raw(fake.new_handle());
        }
        result
    })
}

unsafe extern "system" fn destroy_device(device: vk::Device, _p_allocator: *const vk::AllocationCallbacks<'_>) {
    FakeVulkan::with(|fake| {
        fake.count("vkDestroyDevice");
        fake.release(device.as_raw());
    })
}

unsafe extern "system" fn get_device_queue(_device: vk::Device, family: u32, index: u32, p_queue: *mut vk::Queue) {
    FakeVulkan::with(|fake| fake.count("vkGetDeviceQueue"));
    *p_queue = FakeVulkan::queue_handle(family, index);
}

unsafe extern "system" fn device_wait_idle(_device: vk::Device) -> vk::Result {
    FakeVulkan::with(|fake| fake.next_result("vkDeviceWaitIdle"))
}

unsafe extern "system" fn allocate_command_buffers(
    _device: vk::Device,
    p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
    p_command_buffers: *mut vk::CommandBuffer,
) -> vk::Result {
    let count = (*p_allocate_info).command_buffer_count;
    FakeVulkan::with(|fake| {
        fake.allocate_counts.push(count);
        let result = fake.next_result("vkAllocateCommandBuffers");
        if result == vk::Result::SUCCESS {
            for i in 0..count as usize {
                *p_command_buffers.add(i) = vk::CommandBuffer::from_raw(fake.new_handle());
            }
        }
        result
    })
}

unsafe extern "system" fn free_command_buffers(
    _device: vk::Device,
    _command_pool: vk::CommandPool,
    count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    let buffers = std::slice::from_raw_parts(p_command_buffers, count as usize);
    FakeVulkan::with(|fake| {
        fake.count("vkFreeCommandBuffers");
        for buffer in buffers {
            fake.release(buffer.as_raw());
            fake.freed_command_buffers.push(buffer.as_raw());
        }
    })
}

unsafe extern "system" fn queue_submit(
    _queue: vk::Queue,
    submit_count: u32,
    p_submits: *const vk::SubmitInfo<'_>,
    _fence: vk::Fence,
) -> vk::Result {
    let submits = std::slice::from_raw_parts(p_submits, submit_count as usize);
    let recorded: Vec<Vec<u64>> = submits
        .iter()
        .map(|info| {
            (0..info.command_buffer_count as usize)
                .map(|i| (*info.p_command_buffers.add(i)).as_raw())
                .collect()
        })
        .collect();
    FakeVulkan::with(|fake| {
        fake.last_submit = recorded;
        if let Some(context) = &fake.watched_context {
            let live = context.live_objects();
            fake.live_during_submit.push(live);
        }
        fake.next_result("vkQueueSubmit")
    })
}

unsafe extern "system" fn cmd_execute_commands(
    _command_buffer: vk::CommandBuffer,
    count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    let secondaries = std::slice::from_raw_parts(p_command_buffers, count as usize);
    FakeVulkan::with(|fake| {
        fake.count("vkCmdExecuteCommands");
        fake.last_execute = secondaries.iter().map(|b| b.as_raw()).collect();
    })
}

unsafe extern "system" fn cmd_draw(
    command_buffer: vk::CommandBuffer,
    vertex_count: u32,
    _instance_count: u32,
    _first_vertex: u32,
    _first_instance: u32,
) {
    FakeVulkan::with(|fake| {
        fake.count("vkCmdDraw");
        fake.draws.push((command_buffer.as_raw(), vertex_count));
    })
}

unsafe extern "system" fn create_fence(
    _device: vk::Device,
    _p_create_info: *const vk::FenceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_fence: *mut vk::Fence,
) -> vk::Result {
    FakeVulkan::with(|fake| {
        fake.fence_allocators.push(!p_allocator.is_null());
        let result = fake.next_result("vkCreateFence");
        if result == vk::Result::SUCCESS {
            *p_fence = vk::Fence::from_raw(fake.new_handle());
        }
        result
    })
}

unsafe extern "system" fn destroy_fence(
    _device: vk::Device,
    fence: vk::Fence,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    FakeVulkan::with(|fake| {
        fake.count("vkDestroyFence");
        fake.fence_allocators.push(!p_allocator.is_null());
        fake.release(fence.as_raw());
    })
}
