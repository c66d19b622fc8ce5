//! Opt-in tracing setup for binaries and tests.
//!
//! The library itself only *emits* `tracing` events; it never installs a
//! subscriber on its own. Call [`init`] once from an application entry
//! point (or a test) to get formatted output honoring `RUST_LOG`.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a formatted `tracing` subscriber, once per process.
///
/// The filter comes from `RUST_LOG` when set and falls back to
/// `info,pipewright=debug`. Calling this again, or after another subscriber
/// is already installed, is a no-op.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info,pipewright=debug"))
            .unwrap_or_default();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
