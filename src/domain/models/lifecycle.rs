//! Lifecycle states and teardown bookkeeping

use std::fmt;

use serde::Serialize;

/// Lifecycle of the whole supervised set. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Launching,
    Running,
    TearingDown,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Launching => "launching",
            Self::Running => "running",
            Self::TearingDown => "tearing_down",
            Self::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

/// What caused teardown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum TeardownTrigger {
    /// Every presentation surface was closed
    SurfacesClosed,
    /// Someone asked the application to quit
    QuitRequested,
    /// The host process received a termination signal
    Signal(String),
    /// An unrecovered fault (panic or failed task)
    Fault(String),
    /// Startup supervision failed before anything was presented
    StartupFailed,
}

impl fmt::Display for TeardownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfacesClosed => write!(f, "surfaces closed"),
            Self::QuitRequested => write!(f, "quit requested"),
            Self::Signal(name) => write!(f, "signal {name}"),
            Self::Fault(msg) => write!(f, "fault: {msg}"),
            Self::StartupFailed => write!(f, "startup failed"),
        }
    }
}

/// Summary of one teardown pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// What started this pass
    pub trigger: Option<TeardownTrigger>,
    /// Services that were sent a termination signal by this pass
    pub signaled: Vec<String>,
    /// Services whose process had already exited
    pub already_exited: Vec<String>,
}

impl TeardownReport {
    /// Number of registry entries this pass visited
    pub fn visited(&self) -> usize {
        self.signaled.len() + self.already_exited.len()
    }
}
