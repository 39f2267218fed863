//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod audit_log;
pub mod deploy_events;
pub mod host_runtime;
pub mod host_transport;
pub mod plan_approver;

pub use audit_log::{AuditError, AuditLog};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use host_runtime::{HostRuntime, RuntimeError};
pub use host_transport::{CommandOutput, HostTransport, TransportError};
pub use plan_approver::{AutoApprove, PlanApprover};
