//! Audit Log Implementations

mod jsonl;
mod memory;

pub use jsonl::{JsonlAuditLog, DEFAULT_AUDIT_PATH};
pub use memory::MemoryAuditLog;
