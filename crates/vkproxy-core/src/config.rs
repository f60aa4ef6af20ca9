use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV: &str = "VKPROXY_CONFIG";

/// Longest extension name Vulkan can represent, terminator excluded.
const MAX_EXTENSION_NAME_LEN: usize = 255;

/// Top-level vkproxy configuration, loaded from vkproxy.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VkProxyConfig {
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub extensions: ExtensionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Native Vulkan library to forward to. When unset the platform's
    /// default loader library names are probed.
    pub library_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extensions withheld from applications even when both this driver
    /// and the native driver support them.
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when VKPROXY_LOG is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl VkProxyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML file, or `None` if there is no file.
    pub fn load_if_present(path: &str) -> Result<Option<Self>, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path, "no configuration file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        let config: VkProxyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(path) = &self.driver.library_path {
            if path.trim().is_empty() {
                return Err(CoreError::Config("driver.library_path is empty".into()));
            }
        }
        for name in &self.extensions.disabled {
            if !name.starts_with("VK_") || name.len() > MAX_EXTENSION_NAME_LEN {
                return Err(CoreError::Config(format!(
                    "extensions.disabled: '{}' is not a Vulkan extension name",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Returns the config file path based on platform conventions.
/// Search order:
/// 1. `VKPROXY_CONFIG` environment variable
/// 2. System-wide config: `%PROGRAMDATA%\vkproxy\vkproxy.toml` (Windows) or `/etc/vkproxy/vkproxy.toml`
/// 3. Local fallback: `./vkproxy.toml`
pub fn default_config_path() -> String {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return path;
        }
    }
    #[cfg(windows)]
    {
        let programdata = std::env::var("PROGRAMDATA")
            .unwrap_or_else(|_| r"C:\ProgramData".to_string());
        let system_path = format!(r"{}\vkproxy\vkproxy.toml", programdata);
        if std::path::Path::new(&system_path).exists() {
            return system_path;
        }
    }
    #[cfg(not(windows))]
    {
        let system_path = "/etc/vkproxy/vkproxy.toml";
        if std::path::Path::new(system_path).exists() {
            return system_path.to_string();
        }
    }
    "vkproxy.toml".to_string()
}

fn default_filter() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = VkProxyConfig::from_toml("").unwrap();
        assert!(config.driver.library_path.is_none());
        assert!(config.extensions.disabled.is_empty());
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_full_document() {
        let config = VkProxyConfig::from_toml(
            r#"
            [driver]
            library_path = "/usr/lib/x86_64-linux-gnu/libvulkan_radeon.so"

            [extensions]
            disabled = ["VK_KHR_bind_memory2", "VK_EXT_shader_subgroup_vote"]

            [logging]
            filter = "vkproxy_icd=debug"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.driver.library_path.as_deref(),
            Some("/usr/lib/x86_64-linux-gnu/libvulkan_radeon.so")
        );
        assert_eq!(config.extensions.disabled.len(), 2);
        assert_eq!(config.logging.filter, "vkproxy_icd=debug");
    }

    #[test]
    fn test_rejects_bad_extension_name() {
        let err = VkProxyConfig::from_toml("[extensions]\ndisabled = [\"bind_memory2\"]").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_library_path() {
        let err = VkProxyConfig::from_toml("[driver]\nlibrary_path = \"  \"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_syntax_error_is_toml_error() {
        let err = VkProxyConfig::from_toml("[driver").unwrap_err();
        assert!(matches!(err, CoreError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let loaded = VkProxyConfig::load_if_present("/nonexistent/vkproxy/vkproxy.toml").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_shipped_template_parses() {
        let config = VkProxyConfig::from_toml(include_str!("../../../packaging/vkproxy.toml.template")).unwrap();
        assert!(config.driver.library_path.is_none());
        assert_eq!(config.logging.filter, "warn");
    }
}
