//! Process launcher backed by `tokio::process`

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::watch;

use super::output::{forward_lines, OutputStream};
use crate::domain::errors::LaunchError;
use crate::domain::models::{ExitSummary, ProcessHandle, ServiceSpec};
use crate::domain::ports::ProcessLauncher;

/// Spawns services as child processes in their own process group
///
/// stdout and stderr are forwarded to the log; an exit-watcher task owns
/// the child and reports its exit through the returned [`ProcessHandle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl TokioLauncher {
    pub const fn new() -> Self {
        Self
    }

    fn check_preconditions(spec: &ServiceSpec) -> Result<(), LaunchError> {
        if let Some(missing) = spec.required_paths().iter().find(|path| !path.exists()) {
            tracing::error!(
                service = spec.name(),
                path = %missing.display(),
                "required path missing, not launching"
            );
            return Err(LaunchError::PreconditionFailed {
                service: spec.name().to_string(),
                path: missing.clone(),
            });
        }
        Ok(())
    }

    fn build_command(spec: &ServiceSpec) -> Command {
        let mut cmd = Command::new(spec.command());
        cmd.args(spec.args())
            .envs(spec.env_overlay())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        if let Some(dir) = spec.working_dir() {
            cmd.current_dir(dir);
        }

        // Own group so teardown reaches helpers the service forks, and a
        // terminal Ctrl-C reaches only us.
        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    fn watch_exit(service: String, mut child: Child) -> watch::Receiver<Option<ExitSummary>> {
        let (exit_tx, exit_rx) = watch::channel(None);

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    let summary = ExitSummary::from(status);
                    if summary.is_anomalous() {
                        tracing::warn!(
                            service = %service,
                            exit = %summary,
                            "service process exited unexpectedly"
                        );
                    } else {
                        tracing::info!(service = %service, exit = %summary, "service process exited");
                    }
                    exit_tx.send_replace(Some(summary));
                }
                Err(e) => {
                    tracing::warn!(
                        service = %service,
                        error = %e,
                        "failed to wait for service process"
                    );
                    exit_tx.send_replace(Some(ExitSummary {
                        code: None,
                        signal: None,
                    }));
                }
            }
        });

        exit_rx
    }
}

#[async_trait]
impl ProcessLauncher for TokioLauncher {
    async fn launch(&self, spec: &ServiceSpec) -> Result<ProcessHandle, LaunchError> {
        Self::check_preconditions(spec)?;

        tracing::info!(
            service = spec.name(),
            command = %spec.command().display(),
            args = ?spec.args(),
            working_dir = ?spec.working_dir(),
            "starting service"
        );

        let mut child = Self::build_command(spec).spawn().map_err(|e| {
            tracing::error!(service = spec.name(), error = %e, "failed to start service process");
            LaunchError::from_spawn(spec.name(), spec.command().to_path_buf(), e)
        })?;

        let pid = child.id();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(spec.name().to_string(), OutputStream::Stdout, stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(spec.name().to_string(), OutputStream::Stderr, stderr);
        }

        let exit = Self::watch_exit(spec.name().to_string(), child);
        tracing::info!(service = spec.name(), pid, "service process started");

        Ok(ProcessHandle::new(spec.name(), pid, exit))
    }
}
