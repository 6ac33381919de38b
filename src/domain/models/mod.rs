pub mod config;
pub mod lifecycle;
pub mod process;
pub mod service;
pub mod supervision;

pub use config::{expand_placeholders, Config, LoggingConfig, ServiceConfig};
pub use lifecycle::{LifecycleState, TeardownReport, TeardownTrigger};
pub use process::{ProcessHandle, TerminateOutcome};
pub use service::ServiceSpec;
pub use supervision::{ExitSummary, SupervisionOutcome, SupervisionResult};
