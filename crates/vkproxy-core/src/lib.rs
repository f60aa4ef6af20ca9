//! Configuration and error types shared by the vkproxy crates.

pub mod config;
pub mod error;

pub use config::VkProxyConfig;
pub use error::CoreError;
