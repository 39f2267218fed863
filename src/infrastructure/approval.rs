//! Interactive Plan Approver
//!
//! Asks on the terminal before a plan that deletes host files is applied.
//! Plans without deletes go through unasked.

use std::io::{self, Write};

use dialoguer::Confirm;

use crate::domain::ports::PlanApprover;
use crate::domain::value_objects::{SyncOpKind, SyncOperation};

pub struct InteractiveApprover;

impl InteractiveApprover {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InteractiveApprover {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a plan needs the operator's say-so
pub fn needs_confirmation(operations: &[SyncOperation]) -> bool {
    operations.iter().any(|op| op.kind == SyncOpKind::Delete)
}

impl PlanApprover for InteractiveApprover {
    fn approve(&self, destination: &str, operations: &[SyncOperation]) -> bool {
        if !needs_confirmation(operations) {
            return true;
        }

        let deletes: Vec<&SyncOperation> = operations
            .iter()
            .filter(|op| op.kind == SyncOpKind::Delete)
            .collect();

        let mut stderr = io::stderr();
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "The following {} file(s) will be deleted from {}:",
            deletes.len(),
            destination
        );
        for op in &deletes {
            let _ = writeln!(stderr, "  - {}", op.path);
        }

        Confirm::new()
            .with_prompt(format!("Apply {} operation(s)?", operations.len()))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Fingerprint;

    #[test]
    fn only_deletes_need_confirmation() {
        let uploads = vec![
            SyncOperation::create("a.yaml", Fingerprint::from_bytes(b"a")),
            SyncOperation::update("b.yaml", Fingerprint::from_bytes(b"b")),
        ];
        assert!(!needs_confirmation(&uploads));

        let mut with_delete = uploads.clone();
        with_delete.push(SyncOperation::delete("old.yaml"));
        assert!(needs_confirmation(&with_delete));
    }

    #[test]
    fn upload_only_plan_is_approved_without_prompt() {
        let ops = vec![SyncOperation::create("a.yaml", Fingerprint::from_bytes(b"a"))];
        assert!(InteractiveApprover::new().approve("ha:/config", &ops));
    }
}
