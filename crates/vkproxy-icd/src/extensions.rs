//! Extension allow-lists and filtering.
//!
//! Only extensions whose entry points and structures this driver forwards
//! correctly are advertised. Everything else the native driver reports is
//! hidden from applications.

use std::ffi::CStr;

use ash::vk;
use tracing::debug;

pub const SUPPORTED_INSTANCE_EXTENSIONS: &[&CStr] = &[c"VK_KHR_get_physical_device_properties2"];

pub const SUPPORTED_DEVICE_EXTENSIONS: &[&CStr] = &[
    c"VK_EXT_shader_subgroup_ballot",
    c"VK_EXT_shader_subgroup_vote",
    c"VK_KHR_16bit_storage",
    c"VK_KHR_bind_memory2",
    c"VK_KHR_dedicated_allocation",
    c"VK_KHR_get_memory_requirements2",
    c"VK_KHR_image_format_list",
    c"VK_KHR_maintenance1",
    c"VK_KHR_maintenance2",
    c"VK_KHR_relaxed_block_layout",
    c"VK_KHR_sampler_mirror_clamp_to_edge",
    c"VK_KHR_shader_draw_parameters",
    c"VK_KHR_storage_buffer_storage_class",
    c"VK_KHR_variable_pointers",
];

/// The supported lists minus anything disabled by configuration.
#[derive(Debug, Clone)]
pub struct ExtensionPolicy {
    instance: Vec<&'static CStr>,
    device: Vec<&'static CStr>,
}

impl ExtensionPolicy {
    pub fn new(disabled: &[String]) -> Self {
        let keep = |name: &&'static CStr| {
            let hidden = disabled.iter().any(|d| d.as_bytes() == name.to_bytes());
            if hidden {
                debug!("extension {:?} disabled by configuration", name);
            }
            !hidden
        };

        Self {
            instance: SUPPORTED_INSTANCE_EXTENSIONS.iter().copied().filter(keep).collect(),
            device: SUPPORTED_DEVICE_EXTENSIONS.iter().copied().filter(keep).collect(),
        }
    }

    pub fn instance(&self) -> &[&'static CStr] {
        &self.instance
    }

    pub fn device(&self) -> &[&'static CStr] {
        &self.device
    }
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Name stored in an extension property record, if it is terminated.
pub fn extension_name(props: &vk::ExtensionProperties) -> Option<&CStr> {
    let bytes = unsafe {
        std::slice::from_raw_parts(props.extension_name.as_ptr().cast::<u8>(), props.extension_name.len())
    };
    CStr::from_bytes_until_nul(bytes).ok()
}

/// Keep the native records whose names are in `supported`, in native order.
pub fn filter(native: &[vk::ExtensionProperties], supported: &[&CStr]) -> Vec<vk::ExtensionProperties> {
    native
        .iter()
        .filter(|props| {
            let known = extension_name(props).is_some_and(|name| supported.contains(&name));
            if !known {
                debug!("hiding unsupported extension {:?}", extension_name(props));
            }
            known
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(name: &str, spec_version: u32) -> vk::ExtensionProperties {
        let mut props = vk::ExtensionProperties {
            spec_version,
            ..Default::default()
        };
        for (dst, src) in props.extension_name.iter_mut().zip(name.bytes()) {
            *dst = src as std::ffi::c_char;
        }
        props
    }

    #[test]
    fn test_filter_keeps_supported_in_native_order() {
        let native = [
            props("VK_KHR_swapchain", 70),
            props("VK_KHR_maintenance2", 1),
            props("VK_NV_ray_tracing", 3),
            props("VK_KHR_maintenance1", 2),
        ];
        let filtered = filter(&native, SUPPORTED_DEVICE_EXTENSIONS);
        let names: Vec<_> = filtered.iter().map(|p| extension_name(p).unwrap().to_owned()).collect();
        assert_eq!(names, [c"VK_KHR_maintenance2".to_owned(), c"VK_KHR_maintenance1".to_owned()]);
        assert_eq!(filtered[0].spec_version, 1);
        assert_eq!(filtered[1].spec_version, 2);
    }

    #[test]
    fn test_filter_is_subset_of_both_lists() {
        let native = [props("VK_KHR_get_physical_device_properties2", 2), props("VK_KHR_surface", 25)];
        let filtered = filter(&native, SUPPORTED_INSTANCE_EXTENSIONS);
        assert_eq!(filtered.len(), 1);
        assert!(filtered.len() <= native.len());
        assert!(filtered
            .iter()
            .all(|p| SUPPORTED_INSTANCE_EXTENSIONS.contains(&extension_name(p).unwrap())));
    }

    #[test]
    fn test_unterminated_name_is_hidden() {
        let mut bad = vk::ExtensionProperties::default();
        bad.extension_name.fill(b'A' as std::ffi::c_char);
        assert!(extension_name(&bad).is_none());
        assert!(filter(&[bad], SUPPORTED_DEVICE_EXTENSIONS).is_empty());
    }

    #[test]
    fn test_policy_disables_configured_names() {
        let policy = ExtensionPolicy::new(&["VK_KHR_bind_memory2".to_string()]);
        assert!(!policy.device().contains(&c"VK_KHR_bind_memory2"));
        assert_eq!(policy.device().len(), SUPPORTED_DEVICE_EXTENSIONS.len() - 1);
        assert_eq!(policy.instance(), SUPPORTED_INSTANCE_EXTENSIONS);
    }
}
