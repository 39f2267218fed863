//! Command handlers
//!
//! Each handler returns the process exit code; `anyhow` errors are reserved
//! for failures that prevent the command from producing a result at all.

pub mod check;
pub mod deploy;
pub mod history;
pub mod plan;
pub mod state;

mod session;

pub use session::Session;
