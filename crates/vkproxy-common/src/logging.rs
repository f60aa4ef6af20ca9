use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "VKPROXY_LOG";

/// Initialize structured logging with environment filter.
/// Set VKPROXY_LOG=debug (or trace, info, warn, error) for verbosity control;
/// `fallback` applies when the variable is unset or does not parse.
///
/// Output goes to stderr so it never mixes with the host application's
/// stdout. Returns false when a global subscriber is already installed,
/// which happens whenever the process hosting the driver set up tracing
/// itself or the library was initialized twice.
pub fn init_logging(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
