/// File names of the native Vulkan library, in probe order.
pub fn native_vulkan_library_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["vulkan-1.dll"]
    }
    #[cfg(target_os = "macos")]
    {
        &["libvulkan.1.dylib", "libvulkan.dylib", "libMoltenVK.dylib"]
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        &["libvulkan.so.1", "libvulkan.so"]
    }
}

/// Directories the Vulkan loader scans for ICD manifests on this platform.
pub fn icd_manifest_dirs() -> &'static [&'static str] {
    #[cfg(unix)]
    {
        &[
            "/usr/share/vulkan/icd.d",
            "/etc/vulkan/icd.d",
            "/usr/local/share/vulkan/icd.d",
        ]
    }
    #[cfg(not(unix))]
    {
        &[]
    }
}

/// Returns the platform name string.
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "windows")]
    { "windows" }
    #[cfg(target_os = "linux")]
    { "linux" }
    #[cfg(target_os = "macos")]
    { "macos" }
    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    { "unknown" }
}
