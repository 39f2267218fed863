//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod planner;
mod suggest;
mod validator;

pub use planner::{SyncPlan, SyncPlanner};
pub use suggest::{closest_match, levenshtein};
pub use validator::{
    default_workers, validate, FileRole, UnknownKeyPolicy, ValidationError, ValidationErrorKind,
    ValidationOptions, ValidationReport, ValidationWarning, WarningKind,
};
