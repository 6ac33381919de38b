//! Tandem - supervised launcher for a backend and frontend service pair
//!
//! Tandem brings up a local backend API and a frontend asset server, waits
//! until both accept TCP connections, hands the frontend URL to a
//! presentation layer, and tears every process it started down exactly
//! once when the application ends.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Service specs, supervision outcomes, lifecycle states, ports
//! - **Application Layer** (`application`): Supervision, registry, lifecycle coordination, startup
//! - **Infrastructure Layer** (`infrastructure`): TCP probes, process launching, config, logging, signals
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tandem::{ConfigLoader, LifecycleCoordinator, Startup, TokioLauncher};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let coordinator = Arc::new(LifecycleCoordinator::new());
//!     let startup = Startup::from_config(&config, coordinator, Arc::new(TokioLauncher::new()));
//!     let report = startup.start().await?;
//!     println!("frontend at {}", report.base_url);
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{
    install_panic_hook, LifecycleCoordinator, ProcessRegistry, ServiceSupervisor, Startup,
    StartupReport,
};
pub use domain::errors::{LaunchError, ReadinessError, RegistryError, StartupError};
pub use domain::models::{
    Config, ExitSummary, LifecycleState, LoggingConfig, ProcessHandle, ServiceConfig, ServiceSpec,
    SupervisionOutcome, SupervisionResult, TeardownReport, TeardownTrigger,
};
pub use domain::ports::{Presenter, ProcessLauncher};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::net::{await_ready, probe};
pub use infrastructure::process::TokioLauncher;
