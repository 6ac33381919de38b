//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

use std::net::TcpListener;
use std::time::Duration;

use tandem::ServiceSpec;

/// A loopback port that was free a moment ago
#[allow(dead_code)]
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    listener.local_addr().expect("listener has an address").port()
}

/// Occupy a loopback port for as long as the returned listener lives
#[allow(dead_code)]
pub fn hold_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let port = listener.local_addr().expect("listener has an address").port();
    (listener, port)
}

/// Spec with short timings so supervision tests finish quickly
#[allow(dead_code)]
pub fn fast_spec(name: &str, port: u16, command: &str) -> ServiceSpec {
    ServiceSpec::new(name, "127.0.0.1", port, command)
        .with_readiness(Duration::from_millis(600), Duration::from_millis(100))
        .with_warmup(Duration::from_millis(20))
        .with_probe_timeout(Duration::from_millis(200))
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 20ms until it returns true or timeout is reached.
#[allow(dead_code)]
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    false
}
