//! Ports at the edges of the supervision core.

use async_trait::async_trait;

use super::errors::{LaunchError, StartupError};
use super::models::{ProcessHandle, ServiceSpec};

/// Starts a service as a child process
///
/// Implementations must not block on the child's output and must fail fast
/// when the executable cannot be started. A child that starts and later
/// dies is not a launch failure.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the service described by `spec`
    ///
    /// # Returns
    /// * `Ok(handle)` once the OS process exists
    /// * `Err(LaunchError)` when preconditions fail or spawning fails
    async fn launch(&self, spec: &ServiceSpec) -> Result<ProcessHandle, LaunchError>;
}

/// The presentation layer that loads the frontend once startup succeeds
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show `base_url`
    ///
    /// Resolves once every presentation surface has been closed. An error is
    /// treated as an unrecovered fault and triggers teardown.
    async fn present(&self, base_url: &str) -> anyhow::Result<()>;

    /// Report a fatal startup error instead of showing anything
    fn fatal(&self, error: &StartupError);
}
