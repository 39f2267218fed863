//! Host Transport Implementations
//!
//! - `SshTransport`: remote host through the `ssh` binary
//! - `LocalTransport`: host directory on this machine
//! - `MemoryTransport`: in-memory host for tests and rehearsals

mod local;
mod memory;
mod ssh;

pub use local::LocalTransport;
pub use memory::{MemoryTransport, TransportCall};
pub use ssh::SshTransport;

/// Host-side scratch directory used by the dry-run check.
///
/// Never part of a manifest, whatever the managed roots say.
pub(crate) const INTERNAL_DIR: &str = crate::application::STAGING_ROOT;

pub(crate) fn is_internal(path: &str) -> bool {
    path == INTERNAL_DIR
        || path
            .strip_prefix(INTERNAL_DIR)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Single-quote a string for a POSIX shell
pub(crate) fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Join a host base directory and a tree-relative path
pub(crate) fn join_host(base: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return base.to_string();
    }
    if base.is_empty() || base == "." {
        return relative.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}
