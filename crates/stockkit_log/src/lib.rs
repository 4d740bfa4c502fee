//! `stockkit_log` v1:
//! Process-wide `tracing` subscriber setup.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logging`]
//! once at startup.

use tracing_subscriber::EnvFilter;

/// Fallback filter when neither `RUST_LOG` nor a CLI level is given.
pub const C_LOG_LEVEL_DEFAULT: &str = "info";

/// Build the event filter: `RUST_LOG` wins, else `level_default`.
pub fn derive_env_filter(level_default: &str) -> Result<EnvFilter, String> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level_default)
            .map_err(|err| format!("Invalid log level '{level_default}': {err}")),
    }
}

/// Install a global `fmt` subscriber writing to stderr.
///
/// Fails when `level_default` is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(level_default: &str) -> Result<(), String> {
    let filter = derive_env_filter(level_default)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("Failed to install log subscriber: {err}"))
}
