//! Binding to the native Vulkan implementation.
//!
//! The library is opened once per process. Two shapes are accepted: a
//! Vulkan loader exporting the core commands by name, or a driver library
//! exporting only `vk_icdGetInstanceProcAddr`, in which case every other
//! global command is resolved through it.

use std::ffi::CStr;

use ash::vk;
use libloading::{Library, Symbol};
use tracing::{debug, info};

use vkproxy_core::config::DriverConfig;

use crate::error::IcdError;

/// Global native commands, resolved once.
///
/// `create_instance`, `get_instance_proc_addr` and
/// `enumerate_instance_extension_properties` are required. The remaining
/// entries back up the per-instance table and may be absent.
pub struct NativeDriver {
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub create_instance: vk::PFN_vkCreateInstance,
    pub enumerate_instance_extension_properties: vk::PFN_vkEnumerateInstanceExtensionProperties,
    pub destroy_instance: Option<vk::PFN_vkDestroyInstance>,
    pub get_device_proc_addr: Option<vk::PFN_vkGetDeviceProcAddr>,
    source: String,
    _lib: Option<Library>,
}

impl NativeDriver {
    /// Open the configured library, or the first platform default that loads.
    pub fn load(config: &DriverConfig) -> Result<Self, IcdError> {
        let (lib, source) = Self::load_library(config.library_path.as_deref())?;

        unsafe {
            if let Some(icd_gipa) =
                Self::load_fn_opt::<vk::PFN_vkGetInstanceProcAddr>(&lib, "vk_icdGetInstanceProcAddr")
            {
                debug!("{} is a driver library, resolving through vk_icdGetInstanceProcAddr", source);
                let mut driver = Self::from_get_instance_proc_addr(icd_gipa)?;
                driver.source = source;
                driver._lib = Some(lib);
                return Ok(driver);
            }

            let driver = Self {
                get_instance_proc_addr: Self::load_fn(&lib, "vkGetInstanceProcAddr")?,
                create_instance: Self::load_fn(&lib, "vkCreateInstance")?,
                enumerate_instance_extension_properties: Self::load_fn(
                    &lib,
                    "vkEnumerateInstanceExtensionProperties",
                )?,
                destroy_instance: Self::load_fn_opt(&lib, "vkDestroyInstance"),
                get_device_proc_addr: Self::load_fn_opt(&lib, "vkGetDeviceProcAddr"),
                source,
                _lib: Some(lib),
            };
            info!("native Vulkan driver loaded from {}", driver.source);
            Ok(driver)
        }
    }

    /// Build the binding from an already available `vkGetInstanceProcAddr`.
    ///
    /// # Safety
    /// `get_instance_proc_addr` must behave like the Vulkan command of the
    /// same name when called with a null instance.
    pub unsafe fn from_get_instance_proc_addr(
        get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    ) -> Result<Self, IcdError> {
        let resolve = |name: &CStr| unsafe { get_instance_proc_addr(vk::Instance::null(), name.as_ptr()) };
        let required = |name: &CStr| {
            resolve(name).ok_or_else(|| IcdError::missing(&name.to_string_lossy()))
        };

        Ok(Self {
            get_instance_proc_addr,
            create_instance: std::mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkCreateInstance>(
                required(c"vkCreateInstance")?,
            ),
            enumerate_instance_extension_properties: std::mem::transmute::<
                unsafe extern "system" fn(),
                vk::PFN_vkEnumerateInstanceExtensionProperties,
            >(required(c"vkEnumerateInstanceExtensionProperties")?),
            destroy_instance: resolve(c"vkDestroyInstance").map(|f| {
                std::mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkDestroyInstance>(f)
            }),
            get_device_proc_addr: resolve(c"vkGetDeviceProcAddr").map(|f| {
                std::mem::transmute::<unsafe extern "system" fn(), vk::PFN_vkGetDeviceProcAddr>(f)
            }),
            source: "vkGetInstanceProcAddr".to_string(),
            _lib: None,
        })
    }

    /// Where the binding came from, for diagnostics.
    pub fn source(&self) -> &str {
        &self.source
    }

    fn load_library(configured: Option<&str>) -> Result<(Library, String), IcdError> {
        let names: Vec<&str> = match configured {
            Some(path) => vec![path],
            None => vkproxy_common::platform::native_vulkan_library_names().to_vec(),
        };

        let mut last_err = String::new();
        for name in names {
            match unsafe { Library::new(name) } {
                Ok(lib) => {
                    debug!("opened native Vulkan library {}", name);
                    return Ok((lib, name.to_string()));
                }
                Err(e) => {
                    last_err = format!("{}: {}", name, e);
                    debug!("failed to load {}: {}", name, e);
                }
            }
        }

        Err(IcdError::InitializationFailed(format!(
            "failed to load native Vulkan library: {}",
            last_err
        )))
    }

    unsafe fn load_fn<F: Copy>(lib: &Library, name: &str) -> Result<F, IcdError> {
        let sym: Symbol<F> = lib.get(name.as_bytes()).map_err(|e| {
            debug!("failed to resolve {}: {}", name, e);
            IcdError::missing(name)
        })?;
        Ok(*sym)
    }

    unsafe fn load_fn_opt<F: Copy>(lib: &Library, name: &str) -> Option<F> {
        lib.get(name.as_bytes()).ok().map(|s: Symbol<F>| *s)
    }
}
