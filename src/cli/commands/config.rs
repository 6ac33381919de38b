//! Implementation of the `tandem config` command.

use anyhow::{Context, Result};
use std::process::ExitCode;

use crate::domain::models::Config;

/// Print the resolved configuration as YAML, or JSON in JSON mode
pub fn execute(config: &Config, json_mode: bool) -> Result<ExitCode> {
    println!("{}", render(config, json_mode)?);
    Ok(ExitCode::SUCCESS)
}

fn render(config: &Config, json_mode: bool) -> Result<String> {
    if json_mode {
        serde_json::to_string_pretty(config).context("Failed to serialize configuration")
    } else {
        serde_yaml::to_string(config).context("Failed to serialize configuration")
    }
}
