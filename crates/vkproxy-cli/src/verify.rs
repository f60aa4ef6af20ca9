use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash::vk;
use serde::{Deserialize, Serialize};

use vkproxy_common::platform::icd_manifest_dirs;
use vkproxy_core::config::VkProxyConfig;
use vkproxy_icd::extensions::extension_name;
use vkproxy_icd::instance::{self, Instance};
use vkproxy_icd::IcdContext;

/// File name fragment identifying this driver in manifests.
const ICD_LIBRARY_STEM: &str = "vkproxy_icd";

/// Loader environment variables that replace the manifest search.
const ICD_ENV_OVERRIDES: &[&str] = &["VK_DRIVER_FILES", "VK_ICD_FILENAMES"];

// ── Check result types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    fn pass(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Pass, message)
    }

    fn fail(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Fail, message)
    }

    fn warn(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Warn, message)
    }

    fn skip(name: &str, message: &str) -> Self {
        Self::new(name, CheckStatus::Skip, message)
    }

    fn detail(mut self, detail: &str) -> Self {
        self.details.push(detail.to_string());
        self
    }
}

/// The parts of a loader ICD manifest this tool looks at.
#[derive(Debug, Deserialize)]
struct IcdManifest {
    file_format_version: String,
    #[serde(rename = "ICD")]
    icd: IcdEntry,
}

#[derive(Debug, Deserialize)]
struct IcdEntry {
    library_path: String,
    api_version: Option<String>,
}

// ── Main entry point ────────────────────────────────────────────────────────

pub fn run_verify(config_path: &str, json: bool) -> anyhow::Result<()> {
    let mut results: Vec<CheckResult> = Vec::new();

    let config = check_config(config_path, &mut results);
    let context = check_native_driver(&config, &mut results);
    check_instance_extensions(context.as_deref(), &mut results);
    check_instance_creation(context, &mut results);
    check_icd_manifest(&mut results);

    if json {
        println!("{}", serde_json::to_string(&results)?);
    } else {
        print_results_pretty(&results);
    }

    if results.iter().any(|r| r.status == CheckStatus::Fail) {
        std::process::exit(1);
    }

    Ok(())
}

// ── Check 1: Configuration ──────────────────────────────────────────────────

fn check_config(config_path: &str, results: &mut Vec<CheckResult>) -> VkProxyConfig {
    match VkProxyConfig::load_if_present(config_path) {
        Ok(None) => {
            results.push(
                CheckResult::warn("Configuration", &format!("Config file not found: {}", config_path))
                    .detail("Using default configuration"),
            );
            VkProxyConfig::default()
        }
        Ok(Some(config)) => {
            let mut result = CheckResult::pass("Configuration", &format!("Loaded from {}", config_path))
                .detail(&format!("Log filter: {}", config.logging.filter));
            if config.extensions.disabled.is_empty() {
                result = result.detail("No extensions disabled");
            } else {
                result = result.detail(&format!("Disabled extensions: {}", config.extensions.disabled.join(", ")));
            }
            results.push(result);
            config
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "Configuration",
                &format!("Failed to load {}: {}", config_path, e),
            ));
            VkProxyConfig::default()
        }
    }
}

// ── Check 2: Native driver ──────────────────────────────────────────────────

fn check_native_driver(config: &VkProxyConfig, results: &mut Vec<CheckResult>) -> Option<Arc<IcdContext>> {
    match IcdContext::from_config(config) {
        Ok(context) => {
            let mut result = CheckResult::pass(
                "Native driver",
                &format!("Bound to {}", context.native.source()),
            );
            if context.native.destroy_instance.is_none() {
                result = result.detail("vkDestroyInstance is only available per instance");
            }
            if context.native.get_device_proc_addr.is_none() {
                result = result.detail("vkGetDeviceProcAddr is only available per instance");
            }
            if config.driver.library_path.is_none() {
                result = result
                    .detail("Forwarding to the system Vulkan loader")
                    .detail("Set driver.library_path to a driver library if that loader also sees vkproxy");
            }
            results.push(result);
            Some(context)
        }
        Err(e) => {
            results.push(
                CheckResult::fail("Native driver", &format!("Cannot bind native Vulkan: {}", e))
                    .detail("The ICD reports VK_ERROR_INCOMPATIBLE_DRIVER in this state"),
            );
            None
        }
    }
}

// ── Check 3: Instance extensions ────────────────────────────────────────────

fn check_instance_extensions(context: Option<&IcdContext>, results: &mut Vec<CheckResult>) {
    let Some(context) = context else {
        results.push(CheckResult::skip("Instance extensions", "No native driver bound"));
        return;
    };

    match instance::instance_extensions(context) {
        Ok(extensions) if extensions.is_empty() => {
            results.push(
                CheckResult::warn("Instance extensions", "Native driver supports none of the forwarded extensions")
                    .detail("Applications can still create core Vulkan instances"),
            );
        }
        Ok(extensions) => {
            let mut result = CheckResult::pass(
                "Instance extensions",
                &format!("{} extension(s) advertised", extensions.len()),
            );
            for props in &extensions {
                if let Some(name) = extension_name(props) {
                    result = result.detail(&format!("{} (version {})", name.to_string_lossy(), props.spec_version));
                }
            }
            results.push(result);
        }
        Err(e) => {
            results.push(CheckResult::fail(
                "Instance extensions",
                &format!("Enumeration failed: {}", e),
            ));
        }
    }
}

// ── Check 4: Instance creation ──────────────────────────────────────────────

fn check_instance_creation(context: Option<Arc<IcdContext>>, results: &mut Vec<CheckResult>) {
    let Some(context) = context else {
        results.push(CheckResult::skip("Instance creation", "No native driver bound"));
        return;
    };
    let baseline = context.live_objects();

    let create_info = vk::InstanceCreateInfo::default();
    let instance = match unsafe { Instance::create(Arc::clone(&context), &create_info) } {
        Ok(instance) => instance,
        Err(e) => {
            results.push(CheckResult::fail("Instance creation", &format!("vkCreateInstance failed: {}", e)));
            return;
        }
    };

    let mut result = match instance.physical_devices() {
        Ok(devices) if devices.is_empty() => CheckResult::warn("Instance creation", "Instance created, no physical devices"),
        Ok(devices) => CheckResult::pass(
            "Instance creation",
            &format!("Instance created, {} physical device(s) wrapped", devices.len()),
        ),
        Err(e) => CheckResult::fail("Instance creation", &format!("Physical device enumeration failed: {}", e)),
    };

    let missing = instance.fns().missing();
    if !missing.is_empty() {
        result = result.detail(&format!("{} instance commands unavailable natively", missing.len()));
    }

    drop(instance);
    if context.live_objects() != baseline {
        result.status = CheckStatus::Fail;
        result = result.detail(&format!("{} wrapper(s) leaked after destroy", context.live_objects().abs_diff(baseline)));
    }
    results.push(result);
}

// ── Check 5: ICD manifest ───────────────────────────────────────────────────

fn check_icd_manifest(results: &mut Vec<CheckResult>) {
    for var in ICD_ENV_OVERRIDES {
        let Ok(value) = std::env::var(var) else {
            continue;
        };
        let listed: Vec<PathBuf> = std::env::split_paths(&value).collect();
        match listed.iter().find(|p| mentions_driver(p)) {
            Some(path) => results.push(manifest_result(path).detail(&format!("Selected through {}", var))),
            None => results.push(
                CheckResult::warn("Vulkan ICD", &format!("{} is set but does not list vkproxy", var))
                    .detail("The loader ignores the manifest directories while it is set"),
            ),
        }
        return;
    }

    for dir in icd_manifest_dirs() {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") && mentions_driver(&path) {
                results.push(manifest_result(&path));
                return;
            }
        }
    }

    let mut result = CheckResult::warn("Vulkan ICD", "vkproxy ICD manifest not found");
    for dir in icd_manifest_dirs() {
        result = result.detail(&format!("Searched {}", dir));
    }
    results.push(result.detail("Install packaging/vkproxy_icd.json or set VK_DRIVER_FILES"));
}

fn mentions_driver(path: &Path) -> bool {
    path.to_string_lossy().contains(ICD_LIBRARY_STEM)
        || std::fs::read_to_string(path).is_ok_and(|content| content.contains(ICD_LIBRARY_STEM))
}

fn manifest_result(path: &Path) -> CheckResult {
    let shown = path.display().to_string();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return CheckResult::warn("Vulkan ICD", &format!("Cannot read {}: {}", shown, e)),
    };
    let manifest: IcdManifest = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => return CheckResult::fail("Vulkan ICD", &format!("Malformed manifest {}: {}", shown, e)),
    };

    let mut result = CheckResult::pass("Vulkan ICD", &format!("ICD manifest found at {}", shown))
        .detail(&format!("Format version: {}", manifest.file_format_version))
        .detail(&format!("Library: {}", manifest.icd.library_path));
    if let Some(api_version) = &manifest.icd.api_version {
        result = result.detail(&format!("API version: {}", api_version));
    }

    let library = Path::new(&manifest.icd.library_path);
    if library.is_absolute() && !library.exists() {
        result.status = CheckStatus::Warn;
        result = result.detail("Library path does not exist");
    }
    result
}

// ── Output formatters ───────────────────────────────────────────────────────

fn print_results_pretty(results: &[CheckResult]) {
    println!();
    println!("vkproxy Installation Verification");
    println!("=================================");
    println!();

    let mut pass_count = 0u32;
    let mut fail_count = 0u32;
    let mut warn_count = 0u32;

    for result in results {
        let (icon, color_start, color_end) = match result.status {
            CheckStatus::Pass => {
                pass_count += 1;
                ("[PASS]", "\x1b[32m", "\x1b[0m")
            }
            CheckStatus::Fail => {
                fail_count += 1;
                ("[FAIL]", "\x1b[31m", "\x1b[0m")
            }
            CheckStatus::Warn => {
                warn_count += 1;
                ("[WARN]", "\x1b[33m", "\x1b[0m")
            }
            CheckStatus::Skip => ("[SKIP]", "\x1b[90m", "\x1b[0m"),
        };

        println!("  {}{}{} {} - {}", color_start, icon, color_end, result.name, result.message);
        for detail in &result.details {
            println!("         {}", detail);
        }
        println!();
    }

    println!("---------------------------------");
    println!("  {} passed, {} failed, {} warnings", pass_count, fail_count, warn_count);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_omits_empty_details() {
        let results = vec![
            CheckResult::pass("Configuration", "Loaded"),
            CheckResult::warn("Vulkan ICD", "not found").detail("Searched /etc/vulkan/icd.d"),
        ];
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Configuration","status":"pass","message":"Loaded"},{"name":"Vulkan ICD","status":"warn","message":"not found","details":["Searched /etc/vulkan/icd.d"]}]"#
        );
    }

    #[test]
    fn test_manifest_parses_loader_format() {
        let manifest: IcdManifest = serde_json::from_str(include_str!("../../../packaging/vkproxy_icd.json")).unwrap();
        assert_eq!(manifest.file_format_version, "1.0.0");
        assert!(manifest.icd.library_path.contains(ICD_LIBRARY_STEM));
        assert!(manifest.icd.api_version.is_some());
    }
}
