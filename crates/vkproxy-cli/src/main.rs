use std::ffi::CStr;

use anyhow::Context;
use ash::vk;
use clap::{Parser, Subcommand};
use tracing::debug;

use vkproxy_core::config::{default_config_path, VkProxyConfig};
use vkproxy_icd::dispatch::Dispatchable;
use vkproxy_icd::extensions::{extension_name, ExtensionPolicy, SUPPORTED_DEVICE_EXTENSIONS, SUPPORTED_INSTANCE_EXTENSIONS};
use vkproxy_icd::instance::Instance;
use vkproxy_icd::physical_device::PhysicalDevice;
use vkproxy_icd::IcdContext;

mod verify;

#[derive(Parser)]
#[command(name = "vkproxy")]
#[command(about = "vkproxy - Vulkan ICD that forwards to a native driver")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to VKPROXY_CONFIG or the system location)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the driver forwards and how it is configured
    Info,

    /// Check the installation: configuration, native driver and ICD manifest
    Verify {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    vkproxy_common::init_logging("warn");

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    debug!("using configuration path {}", config_path);

    match cli.command {
        Commands::Info => {
            let config = VkProxyConfig::load_if_present(&config_path)?.unwrap_or_default();

            println!("vkproxy {} ({})", env!("CARGO_PKG_VERSION"), vkproxy_common::platform::platform_name());
            println!("  Configuration:   {}", config_path);
            println!(
                "  Native driver:   {}",
                config.driver.library_path.as_deref().unwrap_or("system Vulkan loader")
            );
            println!("  ICD interface:   up to version {}", vkproxy_icd::MAX_ICD_INTERFACE_VERSION);
            println!(
                "  Conversion:      {}",
                if vkproxy_icd::convert::FIELD_WISE { "field-wise" } else { "pass-through" }
            );
            println!();

            println!("Instance extensions forwarded:");
            for name in SUPPORTED_INSTANCE_EXTENSIONS {
                println!("  {}", name.to_string_lossy());
            }
            println!();

            let policy = ExtensionPolicy::new(&config.extensions.disabled);
            println!("Device extensions forwarded:");
            for name in SUPPORTED_DEVICE_EXTENSIONS {
                if policy.device().contains(name) {
                    println!("  {}", name.to_string_lossy());
                } else {
                    println!("  {} (disabled by configuration)", name.to_string_lossy());
                }
            }
            println!();

            print_devices(&config)?;
        }

        Commands::Verify { json } => {
            verify::run_verify(&config_path, json)?;
        }

        Commands::Config => {
            let config = VkProxyConfig::load_if_present(&config_path)?;
            if config.is_none() {
                println!("# {} not found, showing defaults", config_path);
            }
            print!("{}", toml::to_string_pretty(&config.unwrap_or_default())?);
        }
    }

    Ok(())
}

/// Create an instance through the driver and list what each GPU advertises.
fn print_devices(config: &VkProxyConfig) -> anyhow::Result<()> {
    let context = match IcdContext::from_config(config) {
        Ok(context) => context,
        Err(e) => {
            println!("Native driver: unavailable ({})", e);
            return Ok(());
        }
    };
    println!("Native driver: {}", context.native.source());

    let app_info = vk::ApplicationInfo::default()
        .application_name(c"vkproxy info")
        .api_version(vk::API_VERSION_1_0);
    let create_info = vk::InstanceCreateInfo::default().application_info(&app_info);
    let instance = unsafe { Instance::create(context, &create_info) }.context("creating instance")?;
    let handles = instance.physical_devices().context("enumerating physical devices")?;

    if handles.is_empty() {
        println!("  no physical devices");
    }
    for (i, &handle) in handles.iter().enumerate() {
        let Some(physical_device) = (unsafe { PhysicalDevice::from_handle(handle) }) else {
            continue;
        };

        let mut properties = vk::PhysicalDeviceProperties::default();
        if let Some(get_properties) = instance.fns().get_physical_device_properties {
            unsafe { get_properties(physical_device.native(), &mut properties) };
        }
        let name = properties.device_name_as_c_str().unwrap_or(c"unknown");

        println!("  GPU {}: {}", i, name.to_string_lossy());
        println!("    Type:          {:?}", properties.device_type);
        println!(
            "    API version:   {}.{}.{}",
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version)
        );
        println!("    Queue families: {}", physical_device.queue_family_count()?);
        println!("    Extensions:    {}", physical_device.extensions().len());
        for props in physical_device.extensions() {
            let name: &CStr = extension_name(props).unwrap_or(c"?");
            println!("      {} (version {})", name.to_string_lossy(), props.spec_version);
        }
    }
    Ok(())
}
