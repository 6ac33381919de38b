use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::service::ServiceSpec;

/// Main configuration structure for Tandem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Pause after both services are up, before the presentation layer is signalled
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// API service, always supervised first
    #[serde(default = "ServiceConfig::default_backend")]
    pub backend: ServiceConfig,

    /// Static asset server, supervised once the backend is up
    #[serde(default = "ServiceConfig::default_frontend")]
    pub frontend: ServiceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_settle_delay_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            backend: ServiceConfig::default_backend(),
            frontend: ServiceConfig::default_frontend(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Both services in supervision order
    pub fn services(&self) -> [&ServiceConfig; 2] {
        [&self.backend, &self.frontend]
    }
}

/// Per-service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Service name used in logs and the registry
    pub name: String,

    /// Host to probe
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the service listens on
    pub port: u16,

    /// Executable to run when no candidate exists
    pub command: String,

    /// Executables tried, in order, before `command`
    #[serde(default)]
    pub command_candidates: Vec<PathBuf>,

    /// Arguments; `{host}` and `{port}` are expanded
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory of the child
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Environment overlay; values get the same expansion as `args`
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Paths that must exist before launching
    #[serde(default)]
    pub required_paths: Vec<PathBuf>,

    #[serde(default = "default_readiness_timeout_ms")]
    pub readiness_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_readiness_timeout_ms() -> u64 {
    30_000
}

const fn default_poll_interval_ms() -> u64 {
    500
}

const fn default_warmup_ms() -> u64 {
    1000
}

const fn default_probe_timeout_ms() -> u64 {
    1000
}

impl ServiceConfig {
    /// FastAPI backend on 8001, preferring the project's virtualenv interpreter
    pub fn default_backend() -> Self {
        let mut env = BTreeMap::new();
        env.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());
        env.insert(
            "CORS_ORIGINS".to_string(),
            "http://localhost:3000,http://127.0.0.1:3000".to_string(),
        );

        Self {
            name: "backend".to_string(),
            host: default_host(),
            port: 8001,
            command: "python3".to_string(),
            command_candidates: vec![PathBuf::from("backend/venv/bin/python3")],
            args: [
                "-m",
                "uvicorn",
                "server:app",
                "--host",
                "0.0.0.0",
                "--port",
                "{port}",
                "--log-level",
                "warning",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            working_dir: Some(PathBuf::from("backend")),
            env,
            required_paths: vec![],
            readiness_timeout_ms: default_readiness_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            warmup_ms: 2000,
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }

    /// Static server for the built frontend on 3000
    pub fn default_frontend() -> Self {
        let mut env = BTreeMap::new();
        env.insert("PYTHONUNBUFFERED".to_string(), "1".to_string());

        Self {
            name: "frontend".to_string(),
            host: default_host(),
            port: 3000,
            command: "python3".to_string(),
            command_candidates: vec![PathBuf::from("backend/venv/bin/python3")],
            args: vec!["serve_frontend.py".to_string()],
            working_dir: Some(PathBuf::from("backend")),
            env,
            required_paths: vec![PathBuf::from("frontend/build/index.html")],
            readiness_timeout_ms: default_readiness_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            warmup_ms: default_warmup_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }

    /// First existing candidate, otherwise `command`
    ///
    /// Candidates are checked against the current directory, so the one
    /// chosen is made absolute before the child changes into `working_dir`.
    pub fn resolve_command(&self) -> PathBuf {
        self.command_candidates
            .iter()
            .find(|candidate| candidate.exists())
            .map(|candidate| std::path::absolute(candidate).unwrap_or_else(|_| candidate.clone()))
            .unwrap_or_else(|| PathBuf::from(&self.command))
    }

    /// Build the immutable spec the supervisor works from
    pub fn to_spec(&self) -> ServiceSpec {
        let expand = |value: &str| expand_placeholders(value, &self.host, self.port);

        let env = self
            .env
            .iter()
            .map(|(key, value)| (key.clone(), expand(value)))
            .collect();

        let mut spec = ServiceSpec::new(&self.name, &self.host, self.port, self.resolve_command())
            .with_args(self.args.iter().map(|arg| expand(arg)))
            .with_env_overlay(env)
            .with_readiness(
                Duration::from_millis(self.readiness_timeout_ms),
                Duration::from_millis(self.poll_interval_ms),
            )
            .with_warmup(Duration::from_millis(self.warmup_ms))
            .with_probe_timeout(Duration::from_millis(self.probe_timeout_ms));

        if let Some(ref dir) = self.working_dir {
            spec = spec.with_working_dir(dir);
        }
        for path in &self.required_paths {
            spec = spec.with_required_path(path);
        }
        spec
    }
}

/// Replace `{host}` and `{port}` in a configured value
pub fn expand_placeholders(template: &str, host: &str, port: u16) -> String {
    template
        .replace("{host}", host)
        .replace("{port}", &port.to_string())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Also log to the console when a log directory is set
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: default_true(),
            rotation: default_rotation(),
        }
    }
}
