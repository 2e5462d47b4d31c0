//! Logging setup for binaries and tests embedding the pipeline

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_directive` (for example `"this_query=debug"`)
/// when `RUST_LOG` is unset or invalid. Returns `false` when a global
/// subscriber was already installed.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
