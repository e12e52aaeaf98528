//! Test tracing — installs a subscriber that writes through the test harness.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber for tests. Safe to call from every test;
/// only the first call takes effect. Honors `RUST_LOG`, defaulting to `debug`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
