//! Domain layer for the Tandem supervisor
//!
//! This module contains the service model, outcomes, errors and ports.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{LaunchError, ReadinessError, RegistryError, StartupError};
