//! Terminal presentation surface
//!
//! Prints where the frontend can be reached and then stays open until the
//! application is asked to end by a signal or a quit request.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::domain::errors::StartupError;
use crate::domain::ports::Presenter;

/// Presents the frontend URL on stdout and startup failures on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter {
    json: bool,
}

impl ConsolePresenter {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    fn ready_line(&self, base_url: &str) -> String {
        if self.json {
            json!({ "event": "ready", "url": base_url }).to_string()
        } else {
            format!("Frontend ready at {base_url} (Ctrl-C to stop)")
        }
    }

    fn fatal_line(&self, error: &StartupError) -> String {
        if self.json {
            json!({ "event": "startup_failed", "error": error.to_string() }).to_string()
        } else {
            format!("Error: startup failed: {error}")
        }
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn present(&self, base_url: &str) -> Result<()> {
        println!("{}", self.ready_line(base_url));
        // The terminal surface never closes on its own
        std::future::pending::<()>().await;
        Ok(())
    }

    fn fatal(&self, error: &StartupError) {
        eprintln!("{}", self.fatal_line(error));
    }
}
