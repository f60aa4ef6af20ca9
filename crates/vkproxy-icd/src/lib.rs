//! vkproxy Vulkan ICD (Installable Client Driver)
//!
//! This cdylib sits between the Vulkan loader and a native Vulkan
//! implementation. Every dispatchable object the native driver creates is
//! wrapped so the loader can own its first word; calls are unwrapped and
//! forwarded. Only extensions this driver forwards correctly are advertised.

use std::ffi::{c_char, CStr};
use std::sync::{Arc, OnceLock};

use ash::vk;
use tracing::{debug, error, info, trace, warn};

use vkproxy_core::config::{default_config_path, VkProxyConfig};

pub mod command;
pub mod context;
pub mod convert;
pub mod descriptor;
pub mod device;
pub mod dispatch;
pub mod dispatch_table;
pub mod error;
pub mod extensions;
mod ffi;
pub mod image;
pub mod instance;
pub mod memory;
pub mod native;
pub mod physical_device;
pub mod pipeline;
pub mod proc_table;
pub mod renderpass;
pub mod sync;
mod thunk;

pub use context::IcdContext;
pub use error::IcdError;

/// Highest loader/ICD interface version implemented.
pub const MAX_ICD_INTERFACE_VERSION: u32 = 4;

// ── Driver context singleton ────────────────────────────────

static CONTEXT: OnceLock<Option<Arc<IcdContext>>> = OnceLock::new();

/// Use `context` instead of loading the configured native driver.
///
/// Only effective before the first Vulkan call; returns false afterwards.
pub fn install_context(context: Arc<IcdContext>) -> bool {
    CONTEXT.set(Some(context)).is_ok()
}

/// The process-wide context, bound on first use. `None` means the native
/// driver could not be bound and every entry point reports failure.
pub(crate) fn context() -> Option<Arc<IcdContext>> {
    CONTEXT.get_or_init(init_context).clone()
}

fn init_context() -> Option<Arc<IcdContext>> {
    let path = default_config_path();
    let (config, config_err) = match VkProxyConfig::load_if_present(&path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(e) => (VkProxyConfig::default(), Some(e)),
    };
    vkproxy_common::init_logging(&config.logging.filter);
    if let Some(e) = config_err {
        warn!("ignoring invalid configuration {}: {}", path, e);
    }

    match IcdContext::from_config(&config) {
        Ok(context) => {
            info!("vkproxy ICD bound to {}", context.native.source());
            debug!("field-wise structure conversion: {}", convert::FIELD_WISE);
            Some(context)
        }
        Err(e) => {
            error!("failed to bind native Vulkan driver, ICD disabled: {}", e);
            None
        }
    }
}

// ── ICD Negotiation ─────────────────────────────────────────

/// Negotiate the ICD interface version with the Vulkan loader.
#[no_mangle]
pub unsafe extern "system" fn vk_icdNegotiateLoaderICDInterfaceVersion(p_supported_version: *mut u32) -> vk::Result {
    if context().is_none() {
        return vk::Result::ERROR_INCOMPATIBLE_DRIVER;
    }
    let Some(version) = p_supported_version.as_mut() else {
        return vk::Result::INCOMPLETE;
    };

    let requested = *version;
    *version = requested.min(MAX_ICD_INTERFACE_VERSION);
    debug!("negotiated ICD interface version {} (loader offered {})", *version, requested);
    vk::Result::SUCCESS
}

/// Loader entry for name resolution; identical to `vkGetInstanceProcAddr`.
#[no_mangle]
pub unsafe extern "system" fn vk_icdGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    vkGetInstanceProcAddr(instance, p_name)
}

/// Reachable only through the global table so this library never
/// interposes the native `vkGetInstanceProcAddr` it forwards to.
#[allow(non_snake_case)]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    context()?;
    if p_name.is_null() {
        return None;
    }

    let name = CStr::from_ptr(p_name).to_str().ok()?;
    trace!("vkGetInstanceProcAddr {:?} {}", instance, name);
    proc_table::resolve(instance, name)
}
