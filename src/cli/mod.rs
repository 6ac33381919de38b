//! Command-line interface: argument types, command handlers and output.

pub mod commands;
pub mod output;
pub mod presenter;
pub mod types;

use std::process::ExitCode;

pub use presenter::ConsolePresenter;
pub use types::{Cli, Commands};

/// Report a command error on stderr and return the failure exit code
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ExitCode {
    if json_mode {
        let body = serde_json::json!({ "success": false, "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    ExitCode::FAILURE
}
