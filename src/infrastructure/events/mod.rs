//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//!
//! The human-readable progress sink lives with the CLI views.

mod json;

pub use json::{event_json, JsonEventSink};
