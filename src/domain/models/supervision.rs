//! Supervision outcomes and child exit summaries

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::domain::errors::LaunchError;

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitSummary {
    /// Exit code, `None` when the process was ended by a signal
    pub code: Option<i32>,
    /// Terminating signal number on unix
    pub signal: Option<i32>,
}

impl ExitSummary {
    /// A non-zero, non-null exit code: the child died on its own
    pub const fn is_anomalous(&self) -> bool {
        matches!(self.code, Some(code) if code != 0)
    }
}

impl From<std::process::ExitStatus> for ExitSummary {
    fn from(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

impl fmt::Display for ExitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "signal {signal}"),
            (None, None) => write!(f, "unknown exit status"),
        }
    }
}

/// Terminal outcome of supervising one service
#[derive(Debug)]
pub enum SupervisionOutcome {
    /// Launched by us and accepting connections
    Ready,
    /// Something was already listening; nothing was launched
    AlreadyRunning,
    /// The process could not be started
    LaunchFailed(LaunchError),
    /// The process started but never accepted a connection in time
    TimedOut {
        /// Time spent polling, excluding warm-up
        waited: Duration,
        /// Set when the child had already exited by the time the wait gave up
        exit: Option<ExitSummary>,
    },
}

impl SupervisionOutcome {
    /// `Ready` or `AlreadyRunning`
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ready | Self::AlreadyRunning)
    }

    /// Short machine-friendly label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::AlreadyRunning => "already_running",
            Self::LaunchFailed(_) => "launch_failed",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}

impl fmt::Display for SupervisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::AlreadyRunning => write!(f, "already running"),
            Self::LaunchFailed(err) => write!(f, "launch failed: {err}"),
            Self::TimedOut { waited, exit: None } => {
                write!(f, "not reachable after {}ms", waited.as_millis())
            }
            Self::TimedOut {
                waited,
                exit: Some(exit),
            } => write!(
                f,
                "not reachable after {}ms (process already ended with {exit})",
                waited.as_millis()
            ),
        }
    }
}

/// Result of one `supervise` call. Never mutated after creation.
#[derive(Debug)]
pub struct SupervisionResult {
    service: String,
    outcome: SupervisionOutcome,
    base_url: Option<String>,
}

impl SupervisionResult {
    /// Build a result; the base URL is kept only for successful outcomes
    pub fn new(service: impl Into<String>, outcome: SupervisionOutcome, base_url: String) -> Self {
        let base_url = outcome.is_success().then_some(base_url);
        Self {
            service: service.into(),
            outcome,
            base_url,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub const fn outcome(&self) -> &SupervisionOutcome {
        &self.outcome
    }

    /// `http://host:port` on success
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Consume the result, returning the outcome
    pub fn into_outcome(self) -> SupervisionOutcome {
        self.outcome
    }
}

impl fmt::Display for SupervisionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.service, self.outcome)
    }
}
