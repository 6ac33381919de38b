//! Network reachability: single probes and bounded readiness waits

pub mod probe;
pub mod readiness;

pub use probe::probe;
pub use readiness::await_ready;
