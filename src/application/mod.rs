//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - The full validate → check → sync → reload pipeline
//! - `CheckUseCase` - Validation and host check without deploying
//! - `PlanUseCase` - Read-only sync plan against the live host
//!
//! ## Stages
//!
//! - `HostChecker` - Dry-run check against a staged copy on the host
//! - `TreeSynchronizer` - Applies a sync plan under a deadline
//! - `ReloadOrchestrator` - Reload and health polling

pub mod cancel;
pub mod check;
pub mod deploy;
pub mod host_check;
pub mod plan;
pub mod reload;
pub mod sync;

pub use cancel::CancelToken;
pub use check::{CheckOptions, CheckResult, CheckStatus, CheckUseCase};
pub use deploy::{DeployOptions, DeployOutcome, DeployUseCase};
pub use host_check::{HostCheckMode, HostCheckVerdict, HostChecker, STAGING_ROOT};
pub use plan::{PlanResult, PlanUseCase};
pub use reload::{
    HealthPolicy, Pause, ReloadOrchestrator, ReloadPolicy, ReloadState, ThreadPause,
};
pub use sync::{SyncBudget, SyncOutcome, TreeSynchronizer};
