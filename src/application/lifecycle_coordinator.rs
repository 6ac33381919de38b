//! Lifecycle coordinator
//!
//! Owns the process registry and the `Idle → Launching → Running →
//! TearingDown → Terminated` state machine. Teardown is synchronous,
//! idempotent and safe to trigger from several places at once: every
//! registry entry is signalled exactly once, and already-exited processes
//! are skipped. Teardown does not wait for processes to die.

use std::panic;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

use super::registry::ProcessRegistry;
use crate::domain::models::{LifecycleState, TeardownReport, TeardownTrigger, TerminateOutcome};

/// Coordinates startup states and teardown of every launched service
#[derive(Debug)]
pub struct LifecycleCoordinator {
    registry: ProcessRegistry,
    state: watch::Sender<LifecycleState>,
    quit: watch::Sender<bool>,
    trigger: Mutex<Option<TeardownTrigger>>,
}

impl Default for LifecycleCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::with_registry(ProcessRegistry::new())
    }

    pub fn with_registry(registry: ProcessRegistry) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        let (quit, _) = watch::channel(false);
        Self {
            registry,
            state,
            quit,
            trigger: Mutex::new(None),
        }
    }

    /// Registry handle to pass to the supervisor
    pub const fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Move forward to `to`; returns false if already there or beyond
    fn advance(&self, to: LifecycleState) -> bool {
        let advanced = self.state.send_if_modified(|state| {
            if *state < to {
                *state = to;
                true
            } else {
                false
            }
        });
        if advanced {
            tracing::debug!(state = %to, "lifecycle state changed");
        }
        advanced
    }

    /// `Idle → Launching`
    pub fn begin_launching(&self) -> bool {
        self.advance(LifecycleState::Launching)
    }

    /// `Launching → Running`, once every service is up and presentation
    /// has been signalled. Ignored once teardown has begun.
    pub fn mark_running(&self) -> bool {
        if self.state() != LifecycleState::Launching {
            return false;
        }
        self.advance(LifecycleState::Running)
    }

    /// Ask the application to quit
    pub fn request_quit(&self) {
        self.quit.send_replace(true);
    }

    /// Resolves once [`request_quit`](Self::request_quit) has been called
    pub async fn quit_requested(&self) {
        let mut quit = self.quit.subscribe();
        // The sender lives in `self`, so this only ends on a quit request
        let _ = quit.wait_for(|requested| *requested).await;
    }

    /// Resolves once teardown has begun, whoever started it
    pub async fn teardown_started(&self) {
        let mut state = self.state.subscribe();
        // The sender lives in `self`, so this only ends on a transition
        let _ = state
            .wait_for(|state| *state >= LifecycleState::TearingDown)
            .await;
    }

    /// The trigger that started teardown, once it has begun
    pub fn teardown_trigger(&self) -> Option<TeardownTrigger> {
        self.trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Signal every tracked process and reach `Terminated`
    ///
    /// Safe to call repeatedly and concurrently. Only the call that started
    /// teardown moves the state to `Terminated`; later calls find the
    /// registry already drained and return an empty report.
    pub fn teardown(&self, trigger: TeardownTrigger) -> TeardownReport {
        let owner = {
            // Held across the transition so readers never see TearingDown
            // without its trigger
            let mut first = self.trigger.lock().unwrap_or_else(PoisonError::into_inner);
            let owner = self.advance(LifecycleState::TearingDown);
            if owner {
                *first = Some(trigger.clone());
            }
            owner
        };
        if owner {
            tracing::info!(%trigger, "tearing down supervised services");
        } else {
            tracing::debug!(%trigger, state = %self.state(), "teardown already in progress or done");
        }

        self.registry.close();
        let mut report = TeardownReport {
            trigger: Some(trigger),
            ..TeardownReport::default()
        };
        for handle in self.registry.drain() {
            match handle.terminate() {
                TerminateOutcome::Signaled => {
                    tracing::info!(service = handle.service(), pid = handle.pid(), "sent termination signal");
                    report.signaled.push(handle.service().to_string());
                }
                TerminateOutcome::AlreadyExited => {
                    tracing::info!(service = handle.service(), "service process already exited");
                    report.already_exited.push(handle.service().to_string());
                }
                TerminateOutcome::AlreadyRequested => {
                    tracing::debug!(service = handle.service(), "termination already requested");
                }
            }
        }

        if owner {
            self.advance(LifecycleState::Terminated);
            tracing::info!(
                signaled = report.signaled.len(),
                already_exited = report.already_exited.len(),
                "teardown complete"
            );
        }
        report
    }
}

impl Drop for LifecycleCoordinator {
    fn drop(&mut self) {
        if self.state() < LifecycleState::TearingDown && !self.registry.is_empty() {
            self.teardown(TeardownTrigger::Fault(
                "coordinator dropped before teardown".to_string(),
            ));
        }
    }
}

/// Tear down on panic, then run the previously installed hook
///
/// Holds only a weak reference, so the coordinator can still be dropped.
pub fn install_panic_hook(coordinator: &Arc<LifecycleCoordinator>) {
    let coordinator: Weak<LifecycleCoordinator> = Arc::downgrade(coordinator);
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if let Some(coordinator) = coordinator.upgrade() {
            coordinator.teardown(TeardownTrigger::Fault(info.to_string()));
        }
        previous(info);
    }));
}
