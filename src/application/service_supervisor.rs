//! Per-service supervision: probe, launch if absent, wait for readiness
//!
//! The supervisor never owns a process. Launched handles go straight into
//! the [`ProcessRegistry`], which the lifecycle coordinator tears down.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::Instrument;

use super::registry::ProcessRegistry;
use crate::domain::errors::LaunchError;
use crate::domain::models::{ServiceSpec, SupervisionOutcome, SupervisionResult};
use crate::domain::ports::ProcessLauncher;
use crate::infrastructure::net::{await_ready, probe};

/// Drives one service from "unknown" to a terminal [`SupervisionResult`]
#[derive(Clone)]
pub struct ServiceSupervisor {
    launcher: Arc<dyn ProcessLauncher>,
    registry: ProcessRegistry,
}

impl ServiceSupervisor {
    /// Create a supervisor that launches through `launcher` and records
    /// handles in `registry`
    pub fn new(launcher: Arc<dyn ProcessLauncher>, registry: ProcessRegistry) -> Self {
        Self { launcher, registry }
    }

    pub const fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    /// Supervise one service to a terminal result
    ///
    /// 1. Already reachable: `AlreadyRunning`, nothing is launched.
    /// 2. Launch; a launch error is `LaunchFailed` and no wait happens.
    /// 3. Warm up, then wait for readiness: `Ready` or `TimedOut`.
    pub async fn supervise(&self, spec: &ServiceSpec) -> SupervisionResult {
        let span = tracing::info_span!("supervise", service = spec.name(), port = spec.port());
        let outcome = self.run(spec).instrument(span).await;
        let result = SupervisionResult::new(spec.name(), outcome, spec.base_url());
        log_result(&result);
        result
    }

    async fn run(&self, spec: &ServiceSpec) -> SupervisionOutcome {
        if probe(spec.host(), spec.port(), spec.probe_timeout()).await {
            tracing::info!(address = %spec.address(), "service already running, not launching");
            return SupervisionOutcome::AlreadyRunning;
        }

        if self.registry.has_live(spec.name()) {
            return SupervisionOutcome::LaunchFailed(LaunchError::AlreadyTracked {
                service: spec.name().to_string(),
            });
        }

        let handle = match self.launcher.launch(spec).await {
            Ok(handle) => handle,
            Err(e) => return SupervisionOutcome::LaunchFailed(e),
        };
        let handle = match self.registry.insert(handle) {
            Ok(handle) => handle,
            Err(e) => return SupervisionOutcome::LaunchFailed(e.into()),
        };

        tracing::debug!(warmup_ms = spec.warmup().as_millis(), "waiting before first readiness poll");
        sleep(spec.warmup()).await;

        tracing::info!(
            address = %spec.address(),
            timeout_ms = spec.readiness_timeout().as_millis(),
            "waiting for service to accept connections"
        );
        match await_ready(
            spec.host(),
            spec.port(),
            spec.readiness_timeout(),
            spec.poll_interval(),
            spec.probe_timeout(),
        )
        .await
        {
            Ok(_) => SupervisionOutcome::Ready,
            Err(e) => {
                let exit = handle.exit_summary();
                if let Some(exit) = exit {
                    tracing::warn!(%exit, "service process ended before it became reachable");
                }
                SupervisionOutcome::TimedOut {
                    waited: e.waited,
                    exit,
                }
            }
        }
    }
}

fn log_result(result: &SupervisionResult) {
    let outcome = result.outcome();
    if outcome.is_success() {
        tracing::info!(
            service = result.service(),
            outcome = outcome.label(),
            base_url = result.base_url(),
            "supervision finished"
        );
    } else {
        tracing::error!(
            service = result.service(),
            outcome = outcome.label(),
            detail = %outcome,
            "supervision failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ExitSummary, ProcessHandle};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::watch;

    /// Counts launches and hands out detached handles
    #[derive(Default)]
    struct CountingLauncher {
        launches: AtomicUsize,
        fail: bool,
        // Holding the senders keeps the handles alive
        exits: Mutex<Vec<watch::Sender<Option<ExitSummary>>>>,
    }

    #[async_trait]
    impl ProcessLauncher for CountingLauncher {
        async fn launch(&self, spec: &ServiceSpec) -> Result<ProcessHandle, LaunchError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LaunchError::NotFound {
                    service: spec.name().to_string(),
                    command: spec.command().to_path_buf(),
                });
            }
            let (handle, exit_tx) = ProcessHandle::detached(spec.name());
            self.exits.lock().unwrap().push(exit_tx);
            Ok(handle)
        }
    }

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn fast_spec(name: &str, port: u16) -> ServiceSpec {
        ServiceSpec::new(name, "127.0.0.1", port, "unused")
            .with_readiness(Duration::from_millis(300), Duration::from_millis(50))
            .with_warmup(Duration::from_millis(10))
            .with_probe_timeout(Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_already_running_skips_launch() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let launcher = Arc::new(CountingLauncher::default());
        let supervisor = ServiceSupervisor::new(launcher.clone(), ProcessRegistry::new());

        let result = supervisor.supervise(&fast_spec("backend", port)).await;

        assert!(matches!(result.outcome(), SupervisionOutcome::AlreadyRunning));
        assert_eq!(result.base_url(), Some(format!("http://127.0.0.1:{port}").as_str()));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
        assert!(supervisor.registry().is_empty());
    }

    #[tokio::test]
    async fn test_launch_failure_registers_nothing() {
        let port = free_port().await;
        let launcher = Arc::new(CountingLauncher {
            fail: true,
            ..Default::default()
        });
        let supervisor = ServiceSupervisor::new(launcher.clone(), ProcessRegistry::new());

        let result = supervisor.supervise(&fast_spec("backend", port)).await;

        assert!(matches!(
            result.outcome(),
            SupervisionOutcome::LaunchFailed(LaunchError::NotFound { .. })
        ));
        assert!(result.base_url().is_none());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert!(supervisor.registry().is_empty());
    }

    #[tokio::test]
    async fn test_ready_registers_one_handle() {
        let port = free_port().await;
        let launcher = Arc::new(CountingLauncher::default());
        let supervisor = ServiceSupervisor::new(launcher.clone(), ProcessRegistry::new());

        // Stand in for the child opening its listener shortly after spawn
        let binder = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
            sleep(Duration::from_secs(5)).await;
            drop(listener);
        });

        let result = supervisor.supervise(&fast_spec("frontend", port)).await;

        assert!(matches!(result.outcome(), SupervisionOutcome::Ready), "{result}");
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(supervisor.registry().services(), vec!["frontend".to_string()]);
        binder.abort();
    }

    #[tokio::test]
    async fn test_never_listening_times_out() {
        let port = free_port().await;
        let launcher = Arc::new(CountingLauncher::default());
        let supervisor = ServiceSupervisor::new(launcher, ProcessRegistry::new());

        let result = supervisor.supervise(&fast_spec("backend", port)).await;

        match result.outcome() {
            SupervisionOutcome::TimedOut { waited, exit } => {
                assert!(*waited >= Duration::from_millis(300));
                assert!(exit.is_none());
            }
            other => panic!("expected TimedOut, got {other}"),
        }
        // The launched process stays tracked for teardown
        assert_eq!(supervisor.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_live_tracked_service_is_not_launched_twice() {
        let port = free_port().await;
        let launcher = Arc::new(CountingLauncher::default());
        let registry = ProcessRegistry::new();
        let (existing, _tx) = ProcessHandle::detached("backend");
        registry.insert(existing).unwrap();
        let supervisor = ServiceSupervisor::new(launcher.clone(), registry);

        let result = supervisor.supervise(&fast_spec("backend", port)).await;

        assert!(matches!(
            result.outcome(),
            SupervisionOutcome::LaunchFailed(LaunchError::AlreadyTracked { .. })
        ));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }
}
