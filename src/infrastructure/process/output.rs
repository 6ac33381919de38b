//! Child output forwarding
//!
//! Each captured stream gets its own task that reads lines until EOF and
//! re-emits them as tracing events tagged with the service name. The task
//! ends when the child closes the pipe, so nothing outlives the process.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Which child stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Heuristic for "address already in use" style bind failures.
///
/// Informational only: the message may come from a service that lost a
/// bind race against a healthy instance of itself, so the readiness wait
/// decides the real outcome.
pub fn is_address_in_use(line: &str) -> bool {
    let line = line.to_ascii_lowercase();
    line.contains("address already in use") || line.contains("eaddrinuse")
}

/// Spawn a task forwarding `reader` line by line to the log
pub fn forward_lines<R>(service: String, stream: OutputStream, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => emit(&service, stream, &line),
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(
                        service = %service,
                        stream = stream.as_str(),
                        error = %e,
                        "stopped reading child output"
                    );
                    break;
                }
            }
        }
    })
}

fn emit(service: &str, stream: OutputStream, line: &str) {
    match stream {
        OutputStream::Stdout => {
            tracing::info!(target: "tandem::child", service, stream = "stdout", "{line}");
        }
        OutputStream::Stderr => {
            tracing::warn!(target: "tandem::child", service, stream = "stderr", "{line}");
            if is_address_in_use(line) {
                tracing::info!(
                    service,
                    "port conflict reported by child, deferring to readiness wait"
                );
            }
        }
    }
}
