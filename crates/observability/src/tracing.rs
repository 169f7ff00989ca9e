//! Subscriber installation.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber: JSON lines with timestamps, level
/// filtering taken from `RUST_LOG` (falling back to `info`).
///
/// Only the first call installs anything; later calls are no-ops, so hosts
/// and test binaries can call this unconditionally.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
