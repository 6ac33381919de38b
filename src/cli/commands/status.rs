//! Implementation of the `tandem status` command.

use anyhow::Result;
use serde::Serialize;
use std::process::ExitCode;

use crate::cli::output::{list_table, output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::net::probe;

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub address: String,
    pub reachable: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub services: Vec<ServiceStatus>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["service", "address", "state"]);
        for service in &self.services {
            table.add_row(vec![
                service.name.clone(),
                service.address.clone(),
                if service.reachable { "up" } else { "down" }.to_string(),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Probe every configured service, backend first
pub async fn collect(config: &Config) -> StatusOutput {
    let mut services = Vec::new();
    for service in config.services() {
        let spec = service.to_spec();
        services.push(ServiceStatus {
            name: spec.name().to_string(),
            address: spec.address(),
            reachable: probe(spec.host(), spec.port(), spec.probe_timeout()).await,
        });
    }
    StatusOutput { services }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<ExitCode> {
    output(&collect(config).await, json_mode);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_collect_reports_each_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let up_port = listener.local_addr().unwrap().port();
        let down_port = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            l.local_addr().unwrap().port()
        };

        let mut config = Config::default();
        config.backend.port = up_port;
        config.frontend.port = down_port;

        let status = collect(&config).await;
        assert_eq!(status.services.len(), 2);
        assert_eq!(status.services[0].name, "backend");
        assert!(status.services[0].reachable);
        assert_eq!(status.services[1].name, "frontend");
        assert!(!status.services[1].reachable);

        let human = status.to_human();
        assert!(human.contains("SERVICE"));
        assert!(human.contains("down"));
    }
}
