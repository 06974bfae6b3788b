//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honors `RUST_LOG`, defaulting to `info` when it is unset.
pub fn init() {
    init_with_default("info");
}

/// Initialize the logging system with a custom default filter
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init_with_default(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
