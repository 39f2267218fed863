//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `transport/` - Host transports (SSH, local directory, in-memory)
//! - `runtime` - Command-driven host runtime
//! - `audit/` - Audit log implementations (JSON lines, in-memory)
//! - `events/` - Event sinks (NDJSON)
//! - `tree_loader` - Reads the source directory into a `ConfigTree`

pub mod approval;
pub mod audit;
pub mod events;
pub mod git;
pub mod logging;
pub mod process;
pub mod runtime;
pub mod transport;
pub mod tree_loader;

// Re-export for convenience
pub use approval::InteractiveApprover;
pub use audit::{JsonlAuditLog, MemoryAuditLog};
pub use events::JsonEventSink;
pub use runtime::{CommandRuntime, RuntimeCommands};
pub use transport::{LocalTransport, MemoryTransport, SshTransport, TransportCall};
pub use tree_loader::{load_tree, TreeLoadOptions};
