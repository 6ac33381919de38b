//! Startup sequencing and the run-until-shutdown flow
//!
//! Backend supervision always finishes before frontend supervision starts;
//! a failed backend means the frontend is never probed or launched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use super::lifecycle_coordinator::LifecycleCoordinator;
use super::service_supervisor::ServiceSupervisor;
use crate::domain::errors::StartupError;
use crate::domain::models::{
    Config, LifecycleState, ServiceSpec, SupervisionResult, TeardownReport, TeardownTrigger,
};
use crate::domain::ports::{Presenter, ProcessLauncher};

/// Both services came up
#[derive(Debug)]
pub struct StartupReport {
    pub backend: SupervisionResult,
    pub frontend: SupervisionResult,
    /// URL handed to the presentation layer
    pub base_url: String,
}

/// Sequenced startup of the backend and frontend services
pub struct Startup {
    coordinator: Arc<LifecycleCoordinator>,
    supervisor: ServiceSupervisor,
    backend: ServiceSpec,
    frontend: ServiceSpec,
    settle_delay: Duration,
}

impl Startup {
    pub fn new(
        coordinator: Arc<LifecycleCoordinator>,
        launcher: Arc<dyn ProcessLauncher>,
        backend: ServiceSpec,
        frontend: ServiceSpec,
    ) -> Self {
        let supervisor = ServiceSupervisor::new(launcher, coordinator.registry().clone());
        Self {
            coordinator,
            supervisor,
            backend,
            frontend,
            settle_delay: Duration::ZERO,
        }
    }

    /// Build from loaded configuration
    pub fn from_config(
        config: &Config,
        coordinator: Arc<LifecycleCoordinator>,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self::new(
            coordinator,
            launcher,
            config.backend.to_spec(),
            config.frontend.to_spec(),
        )
        .with_settle_delay(config.settle_delay())
    }

    /// Pause between "both services up" and signalling presentation
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub const fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    fn interrupted(&self) -> bool {
        self.coordinator.state() >= LifecycleState::TearingDown
    }

    /// Supervise backend, then frontend
    pub async fn start(&self) -> Result<StartupReport, StartupError> {
        if !self.coordinator.begin_launching() {
            return Err(StartupError::Interrupted);
        }

        let backend = self.supervisor.supervise(&self.backend).await;
        if !backend.is_success() {
            return Err(StartupError::ServiceFailed(backend));
        }
        if self.interrupted() {
            return Err(StartupError::Interrupted);
        }

        let frontend = self.supervisor.supervise(&self.frontend).await;
        if !frontend.is_success() {
            return Err(StartupError::ServiceFailed(frontend));
        }

        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
        if self.interrupted() {
            return Err(StartupError::Interrupted);
        }

        let base_url = frontend
            .base_url()
            .map_or_else(|| self.frontend.base_url(), str::to_string);
        Ok(StartupReport {
            backend,
            frontend,
            base_url,
        })
    }

    /// Start, present, and tear down when anything asks the application to end
    ///
    /// `shutdown` resolves with the trigger for externally requested ends
    /// (OS signals). Teardown started anywhere else, such as the panic hook,
    /// also ends the run. On startup failure the presenter gets exactly one
    /// `fatal` call and nothing is presented.
    pub async fn run<S>(
        &self,
        presenter: Arc<dyn Presenter>,
        shutdown: S,
    ) -> Result<TeardownReport, StartupError>
    where
        S: Future<Output = TeardownTrigger> + Send,
    {
        tokio::pin!(shutdown);

        let started = tokio::select! {
            started = self.start() => started,
            trigger = &mut shutdown => {
                self.coordinator.teardown(trigger);
                Err(StartupError::Interrupted)
            }
            () = self.coordinator.teardown_started() => Err(StartupError::Interrupted),
        };

        let report = match started {
            Ok(report) => report,
            Err(e) => {
                presenter.fatal(&e);
                self.coordinator.teardown(TeardownTrigger::StartupFailed);
                return Err(e);
            }
        };

        tracing::info!(base_url = %report.base_url, "services ready, presenting");
        let mut presentation = {
            let presenter = Arc::clone(&presenter);
            let base_url = report.base_url.clone();
            tokio::spawn(async move { presenter.present(&base_url).await })
        };
        self.coordinator.mark_running();

        let trigger = tokio::select! {
            presented = &mut presentation => match presented {
                Ok(Ok(())) => TeardownTrigger::SurfacesClosed,
                Ok(Err(e)) => TeardownTrigger::Fault(format!("{e:#}")),
                Err(e) => TeardownTrigger::Fault(e.to_string()),
            },
            () = self.coordinator.quit_requested() => TeardownTrigger::QuitRequested,
            trigger = &mut shutdown => trigger,
            // A panic hook or another owner tore down behind our back
            () = self.coordinator.teardown_started() => self
                .coordinator
                .teardown_trigger()
                .unwrap_or_else(|| TeardownTrigger::Fault("teardown started elsewhere".to_string())),
        };
        presentation.abort();

        Ok(self.coordinator.teardown(trigger))
    }
}
