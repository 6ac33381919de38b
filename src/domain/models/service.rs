//! Per-service launch and readiness settings
//!
//! A [`ServiceSpec`] describes one supervised network service: where it
//! listens, how to start it, and how long to wait for it to come up.
//! Specs are immutable once built; the builder methods consume `self`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default connect timeout for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default bound on the readiness wait.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause between readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default delay between spawning a service and its first readiness poll.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(1);

/// Immutable description of a supervised service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    name: String,
    host: String,
    port: u16,
    command: PathBuf,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
    required_paths: Vec<PathBuf>,
    readiness_timeout: Duration,
    poll_interval: Duration,
    warmup: Duration,
    probe_timeout: Duration,
}

impl ServiceSpec {
    /// Create a spec with default timings and no arguments, overlay or preconditions
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        command: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            command: command.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            required_paths: Vec::new(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            warmup: DEFAULT_WARMUP,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set the argument list passed to the command
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the working directory of the child process
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add one environment overlay entry
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Replace the environment overlay
    #[must_use]
    pub fn with_env_overlay(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Require a path to exist before the service may be launched
    #[must_use]
    pub fn with_required_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.required_paths.push(path.into());
        self
    }

    /// Set the readiness timeout and poll interval
    #[must_use]
    pub const fn with_readiness(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.readiness_timeout = timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Set the warm-up delay applied before the first readiness poll
    #[must_use]
    pub const fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the connect timeout of a single probe
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Environment overlay merged onto the inherited environment (overlay wins)
    pub const fn env_overlay(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn required_paths(&self) -> &[PathBuf] {
        &self.required_paths
    }

    pub const fn readiness_timeout(&self) -> Duration {
        self.readiness_timeout
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub const fn warmup(&self) -> Duration {
        self.warmup
    }

    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL a browser surface would load for this service
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_timings() {
        let spec = ServiceSpec::new("backend", "127.0.0.1", 8001, "python3");

        assert_eq!(spec.name(), "backend");
        assert_eq!(spec.readiness_timeout(), DEFAULT_READINESS_TIMEOUT);
        assert_eq!(spec.poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(spec.probe_timeout(), DEFAULT_PROBE_TIMEOUT);
        assert!(spec.args().is_empty());
        assert!(spec.working_dir().is_none());
    }

    #[test]
    fn test_base_url() {
        let spec = ServiceSpec::new("frontend", "127.0.0.1", 3000, "python3");
        assert_eq!(spec.address(), "127.0.0.1:3000");
        assert_eq!(spec.base_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn test_builder_sets_fields() {
        let spec = ServiceSpec::new("backend", "localhost", 8001, "python3")
            .with_args(["-m", "uvicorn"])
            .with_working_dir("backend")
            .with_env("PYTHONUNBUFFERED", "1")
            .with_required_path("frontend/build/index.html")
            .with_readiness(Duration::from_secs(5), Duration::from_millis(100))
            .with_warmup(Duration::from_millis(20));

        assert_eq!(spec.args(), ["-m", "uvicorn"]);
        assert_eq!(spec.working_dir(), Some(Path::new("backend")));
        assert_eq!(spec.env_overlay().get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));
        assert_eq!(spec.required_paths().len(), 1);
        assert_eq!(spec.readiness_timeout(), Duration::from_secs(5));
        assert_eq!(spec.poll_interval(), Duration::from_millis(100));
        assert_eq!(spec.warmup(), Duration::from_millis(20));
    }
}
