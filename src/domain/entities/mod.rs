//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `ConfigTree` / `ConfigFile` - the local configuration snapshot
//! - `HostManifest` - what the host currently holds
//! - `StateRegistry` - classification of host-side concerns
//! - `DeploymentResult` - the record of one pipeline run

mod config_file;
mod config_tree;
mod deployment;
mod document;
mod manifest;
mod reference;
mod registry;

pub use config_file::{ConfigFile, FileFormat, ParseState};
pub use config_tree::ConfigTree;
pub use deployment::{
    DeploymentRecorder, DeploymentResult, DeploymentStatus, HostCheckSummary, ReloadOutcome,
    ValidationSummary,
};
pub use document::{Document, ParseFailure, Shape};
pub(crate) use document::find_key_line;
pub use manifest::HostManifest;
pub use reference::{IncludeDirMode, Location, Reference, ReferenceKind};
pub use registry::{EntityDefinition, StateRegistry};
