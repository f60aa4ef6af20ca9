//! Process-wide state every wrapper can reach: the native binding, the
//! extension policy and a live-object counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vkproxy_core::VkProxyConfig;

use crate::error::IcdError;
use crate::extensions::ExtensionPolicy;
use crate::native::NativeDriver;

pub struct IcdContext {
    pub native: NativeDriver,
    pub extensions: ExtensionPolicy,
    live: Arc<AtomicUsize>,
}

impl IcdContext {
    pub fn new(native: NativeDriver, extensions: ExtensionPolicy) -> Arc<Self> {
        Arc::new(Self {
            native,
            extensions,
            live: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Bind the native driver named by the configuration.
    pub fn from_config(config: &VkProxyConfig) -> Result<Arc<Self>, IcdError> {
        let native = NativeDriver::load(&config.driver)?;
        let extensions = ExtensionPolicy::new(&config.extensions.disabled);
        Ok(Self::new(native, extensions))
    }

    /// Number of wrapper objects currently alive in this context, plus any
    /// handle translation arrays held for a call still in progress.
    pub fn live_objects(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn track(&self) -> LiveObject {
        self.live.fetch_add(1, Ordering::AcqRel);
        LiveObject {
            live: Arc::clone(&self.live),
        }
    }
}

/// Held by every wrapper and translation array; dropping it releases the count.
pub(crate) struct LiveObject {
    live: Arc<AtomicUsize>,
}

impl Drop for LiveObject {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}
