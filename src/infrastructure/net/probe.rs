//! TCP reachability probe

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Is something accepting TCP connections on `host:port`?
///
/// Refusal, timeout, resolution failure and every other transport error
/// collapse to `false`. The connection, if made, is closed before returning.
pub async fn probe(host: &str, port: u16, connect_timeout: Duration) -> bool {
    match timeout(connect_timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            tracing::trace!(host, port, "probe connected");
            true
        }
        Ok(Err(e)) => {
            tracing::trace!(host, port, error = %e, "probe failed");
            false
        }
        Err(_) => {
            tracing::trace!(
                host,
                port,
                timeout_ms = connect_timeout.as_millis(),
                "probe timed out"
            );
            false
        }
    }
}
