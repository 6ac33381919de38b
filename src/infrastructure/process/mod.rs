//! Child process management: spawning, output capture, exit watching

pub mod launcher;
pub mod output;

pub use launcher::TokioLauncher;
pub use output::{is_address_in_use, OutputStream};
