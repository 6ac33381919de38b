//! Tandem CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use tandem::cli::{commands, handle_error, Cli, Commands};
use tandem::domain::models::Config;
use tandem::infrastructure::config::ConfigLoader;
use tandem::infrastructure::logging::LoggerImpl;

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return handle_error(&err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => return handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Probe(args) => commands::probe::execute(args, cli.json).await,
        Commands::Status => commands::status::execute(&config, cli.json).await,
        Commands::Config => commands::config::execute(&config, cli.json),
    };

    match result {
        Ok(code) => code,
        Err(err) => handle_error(&err, cli.json),
    }
}
