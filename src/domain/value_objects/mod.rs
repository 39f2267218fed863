//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod classification;
mod hash;
mod path_patterns;
mod sync_op;
mod tree_path;

pub use classification::EntityClassification;
pub use hash::Fingerprint;
pub use path_patterns::PathPatterns;
pub use sync_op::{SyncOpKind, SyncOperation};
pub use tree_path::{normalize_tree_path, resolve_relative, ManagedScope};
