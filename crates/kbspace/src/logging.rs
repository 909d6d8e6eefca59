//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` when the variable is unset or invalid.
///
/// Safe to call more than once; only the first call installs anything.
/// Returns whether this call installed the subscriber.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
