//! Implementation of the `tandem probe` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::net::probe;

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Host to connect to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to connect to
    #[arg(short, long)]
    pub port: u16,

    /// Connect timeout in milliseconds
    #[arg(short, long, default_value = "1000", value_name = "MS")]
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ProbeOutput {
    pub address: String,
    pub reachable: bool,
}

impl CommandOutput for ProbeOutput {
    fn to_human(&self) -> String {
        if self.reachable {
            format!("{} is accepting connections", self.address)
        } else {
            format!("{} is not reachable", self.address)
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Exit code 0 when reachable, 1 otherwise
pub async fn execute(args: ProbeArgs, json_mode: bool) -> Result<ExitCode> {
    let reachable = probe(&args.host, args.port, Duration::from_millis(args.timeout_ms)).await;
    let result = ProbeOutput {
        address: format!("{}:{}", args.host, args.port),
        reachable,
    };
    output(&result, json_mode);

    Ok(if reachable {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
