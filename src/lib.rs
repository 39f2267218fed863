//! hapsync - validate, synchronize and reload a home-automation configuration
//!
//! A version-controlled configuration tree is validated locally, checked by
//! the host's own configuration checker against a staged copy, synchronized
//! onto the host's managed roots and reloaded, with every run appended to an
//! audit log.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use config::Config;
pub use error::{HapError, HapResult};
