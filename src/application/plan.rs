//! Plan Use Case
//!
//! Reads the host manifest and computes the sync plan. Nothing is uploaded,
//! nothing is validated and nothing is recorded; `deploy --dry-run` is the
//! audited variant.

use std::sync::Arc;

use crate::domain::entities::{ConfigTree, StateRegistry};
use crate::domain::ports::{HostTransport, TransportError};
use crate::domain::services::{SyncPlan, SyncPlanner};
use crate::domain::value_objects::ManagedScope;

/// Result of the plan operation
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub destination: String,
    /// Files the host holds under the managed roots
    pub host_files: usize,
    pub plan: SyncPlan,
}

pub struct PlanUseCase {
    transport: Arc<dyn HostTransport>,
    registry: StateRegistry,
}

impl PlanUseCase {
    pub fn new(transport: Arc<dyn HostTransport>, registry: StateRegistry) -> Self {
        Self {
            transport,
            registry,
        }
    }

    pub fn execute(
        &self,
        tree: &ConfigTree,
        scope: &ManagedScope,
    ) -> Result<PlanResult, TransportError> {
        let manifest = self.transport.list_manifest(scope)?;
        let plan = SyncPlanner::plan(tree, &manifest, scope, &self.registry);
        tracing::debug!(operations = plan.len(), "plan computed");
        Ok(PlanResult {
            destination: self.transport.describe(),
            host_files: manifest.len(),
            plan,
        })
    }
}
