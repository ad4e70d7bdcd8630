//! Tracing initialisation helpers for tests.
//!
//! The subscriber is installed at most once per process, so every test may
//! call [`init_test_tracing`] unconditionally.

use tracing_subscriber::EnvFilter;

/// Install a subscriber that writes through the test harness and honours
/// `RUST_LOG` (default `debug` for the workspace crates).
///
/// ```ignore
/// #[tokio::test]
/// async fn my_test() {
///     seedbox_test_utils::tracing_setup::init_test_tracing();
///     tracing::debug!("visible with --nocapture");
/// }
/// ```
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("seedbox_rpc=debug,seedbox_exporter=debug,info")),
        )
        .with_test_writer()
        .try_init();
}
