//! Helpers shared by the ICD library and the command line tool.

pub mod logging;
pub mod platform;

pub use logging::init_logging;
