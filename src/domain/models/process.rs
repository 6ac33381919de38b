//! Handle to a launched child process
//!
//! The handle does not own the OS child: an exit-watcher task does, and
//! publishes the exit on a `watch` channel. The handle only reads liveness
//! and sends termination signals. Termination is "signal sent", never
//! "process confirmed dead".

use std::sync::atomic::{AtomicBool, Ordering};

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::sync::watch;

use super::supervision::ExitSummary;

/// What a call to [`ProcessHandle::terminate`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// A termination signal was sent
    Signaled,
    /// The process had already exited; nothing was sent
    AlreadyExited,
    /// Termination was requested earlier; nothing was sent
    AlreadyRequested,
}

/// Reference to a running child process
#[derive(Debug)]
pub struct ProcessHandle {
    service: String,
    pid: Option<u32>,
    exit: watch::Receiver<Option<ExitSummary>>,
    termination_requested: AtomicBool,
}

impl ProcessHandle {
    /// Wrap a child whose exit is published on `exit`
    pub fn new(
        service: impl Into<String>,
        pid: Option<u32>,
        exit: watch::Receiver<Option<ExitSummary>>,
    ) -> Self {
        Self {
            service: service.into(),
            pid,
            exit,
            termination_requested: AtomicBool::new(false),
        }
    }

    /// A handle with no OS process behind it; the sender reports its exit
    ///
    /// Terminating it sends nothing and reports `AlreadyExited`.
    pub fn detached(service: impl Into<String>) -> (Self, watch::Sender<Option<ExitSummary>>) {
        let (tx, rx) = watch::channel(None);
        (Self::new(service, None, rx), tx)
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// True until the exit watcher has observed the process ending
    ///
    /// A watcher that went away without reporting counts as an exit.
    pub fn is_alive(&self) -> bool {
        self.exit.borrow().is_none() && self.exit.has_changed().is_ok()
    }

    pub fn exit_summary(&self) -> Option<ExitSummary> {
        *self.exit.borrow()
    }

    pub fn termination_requested(&self) -> bool {
        self.termination_requested.load(Ordering::SeqCst)
    }

    /// Wait for the process to exit
    ///
    /// Returns `None` if the exit watcher went away without reporting.
    pub async fn wait(&self) -> Option<ExitSummary> {
        let mut exit = self.exit.clone();
        if exit.wait_for(Option::is_some).await.is_err() {
            return None;
        }
        let summary = *exit.borrow();
        summary
    }

    /// Send SIGTERM to the process group, at most once
    ///
    /// Never fails: a process that vanished between the liveness check and
    /// the signal counts as already exited.
    pub fn terminate(&self) -> TerminateOutcome {
        if self.termination_requested.swap(true, Ordering::SeqCst) {
            return TerminateOutcome::AlreadyRequested;
        }
        if !self.is_alive() {
            return TerminateOutcome::AlreadyExited;
        }

        // Without a pid there is nothing to signal
        let Some(pid) = self.pid.and_then(|pid| i32::try_from(pid).ok()) else {
            return TerminateOutcome::AlreadyExited;
        };
        let pid = Pid::from_raw(pid);

        match signal::killpg(pid, Signal::SIGTERM) {
            Ok(()) => TerminateOutcome::Signaled,
            Err(_) => match signal::kill(pid, Signal::SIGTERM) {
                Ok(()) => TerminateOutcome::Signaled,
                Err(Errno::ESRCH) => TerminateOutcome::AlreadyExited,
                Err(e) => {
                    tracing::debug!(
                        service = %self.service,
                        pid = pid.as_raw(),
                        error = %e,
                        "termination signal failed"
                    );
                    TerminateOutcome::AlreadyExited
                }
            },
        }
    }
}
