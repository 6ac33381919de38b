//! Infrastructure layer module
//!
//! Adapters to the operating system and the outside world:
//! - Configuration loading (figment)
//! - Logging (tracing)
//! - TCP reachability probes and readiness polling
//! - Child process launching and output forwarding
//! - OS shutdown signals
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod net;
pub mod process;
pub mod signals;
