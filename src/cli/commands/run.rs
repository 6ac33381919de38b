//! Implementation of the `tandem run` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{install_panic_hook, LifecycleCoordinator, Startup};
use crate::cli::output::{output, CommandOutput};
use crate::cli::presenter::ConsolePresenter;
use crate::domain::models::{Config, TeardownReport};
use crate::domain::ports::{Presenter, ProcessLauncher};
use crate::infrastructure::process::TokioLauncher;
use crate::infrastructure::signals::shutdown_trigger;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the pause between "both services ready" and presentation
    #[arg(long, value_name = "MS")]
    pub settle_delay_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub trigger: Option<String>,
    pub signaled: Vec<String>,
    pub already_exited: Vec<String>,
}

impl From<TeardownReport> for RunOutput {
    fn from(report: TeardownReport) -> Self {
        Self {
            trigger: report.trigger.map(|t| t.to_string()),
            signaled: report.signaled,
            already_exited: report.already_exited,
        }
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Shut down ({})",
            self.trigger.as_deref().unwrap_or("unknown trigger")
        )];
        if !self.signaled.is_empty() {
            lines.push(format!("  stopped: {}", self.signaled.join(", ")));
        }
        if !self.already_exited.is_empty() {
            lines.push(format!("  already exited: {}", self.already_exited.join(", ")));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<ExitCode> {
    let coordinator = Arc::new(LifecycleCoordinator::new());
    install_panic_hook(&coordinator);

    let launcher: Arc<dyn ProcessLauncher> = Arc::new(TokioLauncher::new());
    let mut startup = Startup::from_config(config, Arc::clone(&coordinator), launcher);
    if let Some(ms) = args.settle_delay_ms {
        startup = startup.with_settle_delay(Duration::from_millis(ms));
    }

    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter::new(json_mode));
    match startup.run(presenter, shutdown_trigger()).await {
        Ok(report) => {
            output(&RunOutput::from(report), json_mode);
            Ok(ExitCode::SUCCESS)
        }
        // The presenter has already reported the failure
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TeardownTrigger;

    #[test]
    fn test_run_output_from_report() {
        let report = TeardownReport {
            trigger: Some(TeardownTrigger::Signal("SIGINT".to_string())),
            signaled: vec!["backend".to_string(), "frontend".to_string()],
            already_exited: vec![],
        };
        let out = RunOutput::from(report);
        assert_eq!(out.trigger.as_deref(), Some("signal SIGINT"));

        let human = out.to_human();
        assert!(human.contains("signal SIGINT"));
        assert!(human.contains("backend, frontend"));
        assert!(!human.contains("already exited"));
    }
}
