//! The full deploy pipeline
//!
//! Validation, the dry-run host check on a staged copy, the sync itself,
//! then reload and health polling. Every run that gets past option parsing
//! leaves one audit record, whatever its outcome.
//!
//! ```ignore
//! let outcome = DeployUseCase::new(transport, runtime, audit, registry)
//!     .with_approver(approver)
//!     .execute(&tree, &options);
//! std::process::exit(outcome.status.exit_code());
//! ```

mod options;
mod result;
mod use_case;

pub use options::DeployOptions;
pub use result::DeployOutcome;
pub use use_case::DeployUseCase;

#[cfg(test)]
mod tests;
