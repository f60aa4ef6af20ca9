use std::collections::TryReserveError;

use ash::vk;

/// Failures inside the driver. Every variant collapses to a `vk::Result`
/// at the C boundary.
#[derive(Debug, thiserror::Error)]
pub enum IcdError {
    #[error("out of host memory")]
    OutOfHostMemory,

    #[error("native driver returned {0:?}")]
    Native(vk::Result),

    #[error("layer not present")]
    LayerNotPresent,

    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("native driver does not provide {0}")]
    MissingEntryPoint(String),

    #[error("queue family index {index} out of range ({count} families)")]
    InvalidQueueFamily { index: u32, count: u32 },
}

impl IcdError {
    pub(crate) fn missing(name: &str) -> Self {
        Self::MissingEntryPoint(name.to_string())
    }
}

impl From<TryReserveError> for IcdError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfHostMemory
    }
}

impl From<IcdError> for vk::Result {
    fn from(err: IcdError) -> Self {
        match err {
            IcdError::OutOfHostMemory => vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            IcdError::Native(result) => result,
            IcdError::LayerNotPresent => vk::Result::ERROR_LAYER_NOT_PRESENT,
            IcdError::InitializationFailed(_)
            | IcdError::MissingEntryPoint(_)
            | IcdError::InvalidQueueFamily { .. } => vk::Result::ERROR_INITIALIZATION_FAILED,
        }
    }
}

/// Turn a native result into `Ok` only for `SUCCESS`.
pub(crate) fn check(result: vk::Result) -> Result<(), IcdError> {
    if result == vk::Result::SUCCESS {
        Ok(())
    } else {
        Err(IcdError::Native(result))
    }
}
