use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::models::config::{Config, ServiceConfig};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Service name cannot be empty")]
    EmptyServiceName,

    #[error("Duplicate service name: {0}")]
    DuplicateServiceName(String),

    #[error("Invalid port for service '{0}': must be between 1 and 65535")]
    InvalidPort(String),

    #[error("Services '{0}' and '{1}' both use {2}")]
    AddressConflict(String, String, String),

    #[error("Service '{0}' command cannot be empty")]
    EmptyCommand(String),

    #[error("Invalid readiness timing for service '{service}': {reason}")]
    InvalidTiming { service: String, reason: String },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tandem/config.yaml (project config)
    /// 3. .tandem/local.yaml (project local overrides, optional)
    /// 4. Environment variables (TANDEM_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".tandem/config.yaml"))
            .merge(Yaml::file(".tandem/local.yaml"))
            .merge(Env::prefixed("TANDEM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment overrides still apply
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("TANDEM_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        let mut addresses: Vec<(&str, String)> = Vec::new();

        for service in config.services() {
            Self::validate_service(service)?;

            if !names.insert(service.name.as_str()) {
                return Err(ConfigError::DuplicateServiceName(service.name.clone()));
            }

            let address = format!("{}:{}", service.host, service.port);
            if let Some((other, _)) = addresses.iter().find(|(_, a)| *a == address) {
                return Err(ConfigError::AddressConflict(
                    (*other).to_string(),
                    service.name.clone(),
                    address,
                ));
            }
            addresses.push((service.name.as_str(), address));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }

    fn validate_service(service: &ServiceConfig) -> Result<(), ConfigError> {
        if service.name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }
        if service.port == 0 {
            return Err(ConfigError::InvalidPort(service.name.clone()));
        }
        if service.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand(service.name.clone()));
        }

        let invalid = |reason: &str| ConfigError::InvalidTiming {
            service: service.name.clone(),
            reason: reason.to_string(),
        };
        if service.readiness_timeout_ms == 0 {
            return Err(invalid("readiness_timeout_ms must be positive"));
        }
        if service.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms must be positive"));
        }
        if service.poll_interval_ms > service.readiness_timeout_ms {
            return Err(invalid(
                "poll_interval_ms cannot exceed readiness_timeout_ms",
            ));
        }
        if service.probe_timeout_ms == 0 {
            return Err(invalid("probe_timeout_ms must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.backend.port, 8001);
        assert_eq!(config.frontend.port, 3000);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.backend.port = 0;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::InvalidPort(name)) if name == "backend"));
    }

    #[test]
    fn test_validate_same_address() {
        let mut config = Config::default();
        config.frontend.port = config.backend.port;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::AddressConflict(..))));
    }

    #[test]
    fn test_validate_same_port_different_host_is_allowed() {
        let mut config = Config::default();
        config.frontend.port = config.backend.port;
        config.frontend.host = "127.0.0.2".to_string();

        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_duplicate_names() {
        let mut config = Config::default();
        config.frontend.name = "backend".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::DuplicateServiceName(_))));
    }

    #[test]
    fn test_validate_empty_command() {
        let mut config = Config::default();
        config.frontend.command = "  ".to_string();

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::EmptyCommand(name)) if name == "frontend"));
    }

    #[test]
    fn test_validate_poll_interval_exceeds_timeout() {
        let mut config = Config::default();
        config.backend.readiness_timeout_ms = 100;
        config.backend.poll_interval_ms = 500;

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::InvalidTiming { .. })));
    }

    #[test]
    fn test_validate_zero_timings() {
        let mut config = Config::default();
        config.backend.poll_interval_ms = 0;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = Config::default();
        config.frontend.probe_timeout_ms = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));
    }

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "settle_delay_ms: 250\nbackend:\n  port: 9001\nlogging:\n  level: debug"
        )
        .unwrap();
        file.flush().unwrap();

        let config = temp_env::with_vars_unset(["TANDEM_BACKEND__PORT"], || {
            ConfigLoader::load_from_file(file.path()).unwrap()
        });

        assert_eq!(config.settle_delay_ms, 250);
        assert_eq!(config.backend.port, 9001);
        assert_eq!(config.backend.name, "backend", "default should persist");
        assert_eq!(config.backend.command, "python3");
        assert_eq!(config.frontend.port, 3000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "frontend:\n  port: 4000").unwrap();
        file.flush().unwrap();

        let config = temp_env::with_vars(
            [
                ("TANDEM_FRONTEND__PORT", Some("4100")),
                ("TANDEM_LOGGING__FORMAT", Some("json")),
            ],
            || ConfigLoader::load_from_file(file.path()).unwrap(),
        );

        assert_eq!(config.frontend.port, 4100);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let err = ConfigLoader::load_from_file("/nonexistent/tandem.yaml").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend:\n  port: 3000").unwrap();
        file.flush().unwrap();

        let result = temp_env::with_vars_unset(
            ["TANDEM_BACKEND__PORT", "TANDEM_FRONTEND__PORT"],
            || ConfigLoader::load_from_file(file.path()),
        );
        assert!(result.is_err());
    }
}
