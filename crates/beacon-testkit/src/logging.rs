//! Test logging

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static TRACING: OnceCell<()> = OnceCell::new();

/// Route `tracing` output through the test harness
///
/// Honors `RUST_LOG`, defaulting to debug for the beacon crates. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("beacon_core=debug,beacon_client=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
