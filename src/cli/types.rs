//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{probe::ProbeArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(about = "Tandem - launch and supervise a backend and frontend service pair", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file, used instead of .tandem/config.yaml and .tandem/local.yaml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start both services, present the frontend, and supervise until shutdown
    Run(RunArgs),

    /// Check once whether something accepts TCP connections on an address
    Probe(ProbeArgs),

    /// Probe every configured service
    Status,

    /// Print the resolved configuration
    Config,
}
