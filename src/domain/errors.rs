//! Domain errors for the supervision core.
//!
//! Probe failures never appear here: a probe that cannot connect for any
//! reason simply reports "not reachable".

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::models::SupervisionResult;

/// A service could not be started
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{service}: required path {} does not exist", path.display())]
    PreconditionFailed { service: String, path: PathBuf },

    #[error("{service}: executable {} not found", command.display())]
    NotFound { service: String, command: PathBuf },

    #[error("{service}: permission denied running {}", command.display())]
    PermissionDenied { service: String, command: PathBuf },

    #[error("{service}: failed to spawn {}: {source}", command.display())]
    Spawn {
        service: String,
        command: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{service}: already tracked by the registry")]
    AlreadyTracked { service: String },

    #[error("{service}: teardown started before the process could be tracked")]
    TeardownInProgress { service: String },
}

impl From<RegistryError> for LaunchError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyTracked(service) => Self::AlreadyTracked { service },
            RegistryError::Closed(service) => Self::TeardownInProgress { service },
        }
    }
}

impl LaunchError {
    /// Classify a spawn-time I/O error
    pub fn from_spawn(service: &str, command: PathBuf, source: std::io::Error) -> Self {
        let service = service.to_string();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { service, command },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { service, command },
            _ => Self::Spawn {
                service,
                command,
                source,
            },
        }
    }
}

/// Readiness was not achieved within its bound
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{address} not reachable after {}ms ({attempts} attempts)", waited.as_millis())]
pub struct ReadinessError {
    pub address: String,
    pub waited: Duration,
    pub attempts: u32,
}

/// Registry bookkeeping errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("service {0} already has a live process")]
    AlreadyTracked(String),

    #[error("registry closed by teardown, not tracking {0}")]
    Closed(String),
}

/// Startup aborted; exactly one of these reaches the presentation layer
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{0}")]
    ServiceFailed(SupervisionResult),

    #[error("startup interrupted by teardown")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_spawn_classifies_kind() {
        let err = LaunchError::from_spawn(
            "backend",
            PathBuf::from("/nope"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(matches!(err, LaunchError::NotFound { .. }));

        let err = LaunchError::from_spawn(
            "backend",
            PathBuf::from("/etc/passwd"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, LaunchError::PermissionDenied { .. }));

        let err = LaunchError::from_spawn(
            "backend",
            PathBuf::from("python3"),
            io::Error::from(io::ErrorKind::Other),
        );
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[test]
    fn test_launch_error_messages() {
        let err = LaunchError::PreconditionFailed {
            service: "frontend".to_string(),
            path: PathBuf::from("frontend/build/index.html"),
        };
        assert_eq!(
            err.to_string(),
            "frontend: required path frontend/build/index.html does not exist"
        );
    }
}
