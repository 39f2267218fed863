//! Error types for hapsync
//!
//! Validation problems are *data* (see `domain::services::validator`) and never
//! show up here. These are the failures that stop an operation outright.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{AuditError, TransportError};

/// Result type alias for hapsync operations
pub type HapResult<T> = Result<T, HapError>;

/// Main error type for hapsync operations
#[derive(Error, Debug)]
pub enum HapError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Source tree root does not exist
    #[error("configuration source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Two files in a tree normalized to the same path
    #[error("duplicate path '{path}' in configuration tree")]
    DuplicatePath { path: String },

    /// The classification registry names an entity twice
    #[error("entity '{name}' is classified more than once")]
    DuplicateEntity { name: String },

    /// A path pattern or managed root is not usable
    #[error("invalid path pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Walking the source tree failed
    #[error("failed to read source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Transport failure outside a pipeline run
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Audit log failure
    #[error(transparent)]
    Audit(#[from] AuditError),
}
