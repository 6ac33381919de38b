//! OS shutdown signal handling
//!
//! On Unix, SIGINT, SIGTERM and SIGQUIT end the application; elsewhere only
//! Ctrl-C does.

use crate::domain::models::TeardownTrigger;

/// Resolve with the name of the first shutdown signal received
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolve when Ctrl-C is received
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("CTRL_C")
}

/// Teardown trigger for the first shutdown signal
///
/// If handlers cannot be installed the failure itself becomes the trigger,
/// so the application never keeps running without a way to stop it.
pub async fn shutdown_trigger() -> TeardownTrigger {
    match wait_for_shutdown_signal().await {
        Ok(name) => TeardownTrigger::Signal(name.to_string()),
        Err(e) => {
            tracing::error!(error = %e, "failed to install signal handlers");
            TeardownTrigger::Fault(format!("signal handlers unavailable: {e}"))
        }
    }
}
