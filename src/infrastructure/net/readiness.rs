//! Bounded readiness polling

use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::probe::probe;
use crate::domain::errors::ReadinessError;

/// Poll `host:port` every `interval` until it accepts a connection or
/// `timeout` has elapsed.
///
/// Each connect attempt is bounded by `min(probe_timeout, interval)`, so a
/// timed-out wait returns no earlier than `timeout` and no later than about
/// `timeout + interval`. Warm-up is the caller's concern.
///
/// # Returns
/// * `Ok(attempts)` on the first successful probe
/// * `Err(ReadinessError)` when the deadline passes
pub async fn await_ready(
    host: &str,
    port: u16,
    timeout: Duration,
    interval: Duration,
    probe_timeout: Duration,
) -> Result<u32, ReadinessError> {
    let start = Instant::now();
    let deadline = start + timeout;
    let attempt_timeout = probe_timeout.min(interval);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if probe(host, port, attempt_timeout).await {
            tracing::debug!(
                host,
                port,
                attempts,
                elapsed_ms = start.elapsed().as_millis(),
                "port became reachable"
            );
            return Ok(attempts);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ReadinessError {
                address: format!("{host}:{port}"),
                waited: now - start,
                attempts,
            });
        }

        tracing::trace!(host, port, attempts, "port not reachable yet");
        sleep(interval.min(deadline - now)).await;
    }
}
