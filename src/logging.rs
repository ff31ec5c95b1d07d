//! Logging bootstrap for embedding services and tests. The gate itself only
//! emits through `tracing`; hosts that already install a subscriber can skip
//! this entirely.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs an env-filtered fmt subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    let _ = fmt().with_env_filter(filter).try_init();
}
