//! Application layer: supervision, lifecycle and startup sequencing

pub mod lifecycle_coordinator;
pub mod registry;
pub mod service_supervisor;
pub mod startup;

pub use lifecycle_coordinator::{install_panic_hook, LifecycleCoordinator};
pub use registry::ProcessRegistry;
pub use service_supervisor::ServiceSupervisor;
pub use startup::{Startup, StartupReport};
