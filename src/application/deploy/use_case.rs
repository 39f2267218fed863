//! Deploy Use Case
//!
//! Orchestrates one pipeline run:
//! 1. Validate the tree (no host contact)
//! 2. Dry-run host check against a staged copy
//! 3. Read the host manifest and plan the sync
//! 4. Apply the plan
//! 5. Reload and poll health
//! 6. Append the `DeploymentResult` to the audit log
//!
//! Any stage may end the run; whichever does, exactly one result is recorded.

use std::sync::Arc;

use crate::application::cancel::CancelToken;
use crate::application::host_check::{HostCheckMode, HostCheckVerdict, HostChecker};
use crate::application::reload::{Pause, ReloadOrchestrator, ThreadPause};
use crate::application::sync::{SyncOutcome, TreeSynchronizer};
use crate::domain::entities::{
    ConfigTree, DeploymentRecorder, DeploymentStatus, HostCheckSummary, ReloadOutcome,
    StateRegistry,
};
use crate::domain::ports::{
    AuditLog, AutoApprove, DeployEvent, DeployEventSink, HostRuntime, HostTransport,
    NoopEventSink, PlanApprover,
};
use crate::domain::services::{validate, SyncPlan, SyncPlanner, ValidationReport};

use super::options::DeployOptions;
use super::result::DeployOutcome;

/// Deploy use case - orchestrates the pipeline
///
/// Parameterized by its ports, so tests can substitute an in-memory host.
pub struct DeployUseCase {
    transport: Arc<dyn HostTransport>,
    runtime: Arc<dyn HostRuntime>,
    audit: Arc<dyn AuditLog>,
    registry: StateRegistry,
    approver: Arc<dyn PlanApprover>,
    pause: Arc<dyn Pause>,
    cancel: CancelToken,
}

/// Everything needed to close a run
struct RunEnd {
    status: DeploymentStatus,
    reason: Option<String>,
    plan: Option<SyncPlan>,
}

impl RunEnd {
    fn new(status: DeploymentStatus) -> Self {
        Self {
            status,
            reason: None,
            plan: None,
        }
    }

    fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn with_plan(mut self, plan: SyncPlan) -> Self {
        self.plan = Some(plan);
        self
    }
}

impl DeployUseCase {
    pub fn new(
        transport: Arc<dyn HostTransport>,
        runtime: Arc<dyn HostRuntime>,
        audit: Arc<dyn AuditLog>,
        registry: StateRegistry,
    ) -> Self {
        Self {
            transport,
            runtime,
            audit,
            registry,
            approver: Arc::new(AutoApprove),
            pause: Arc::new(ThreadPause),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_approver(mut self, approver: Arc<dyn PlanApprover>) -> Self {
        self.approver = approver;
        self
    }

    pub fn with_pause(mut self, pause: Arc<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute a run without event reporting
    pub fn execute(&self, tree: &ConfigTree, options: &DeployOptions) -> DeployOutcome {
        self.execute_with_events(tree, options, Arc::new(NoopEventSink))
    }

    /// Execute a run, emitting progress events
    pub fn execute_with_events(
        &self,
        tree: &ConfigTree,
        options: &DeployOptions,
        events: Arc<dyn DeployEventSink>,
    ) -> DeployOutcome {
        let destination = self.transport.describe();
        let mut recorder = DeploymentRecorder::start(
            tree.digest(),
            options.source_revision.clone(),
            destination.clone(),
        );
        let run_id = recorder.id().to_string();
        let span = tracing::info_span!("deploy", run = %run_id, destination = %destination);
        let _guard = span.enter();

        events.on_event(DeployEvent::Started {
            run_id: run_id.clone(),
            source: tree.root().to_path_buf(),
            destination: destination.clone(),
            file_count: tree.len(),
        });

        let report = validate(tree, &self.registry, &options.validation);
        recorder.record_validation(report.errors().len(), report.warnings().len());
        events.on_event(DeployEvent::Validated {
            errors: report.errors().len(),
            warnings: report.warnings().len(),
        });

        let end = self.run_stages(tree, options, &report, &mut recorder, &run_id, events.as_ref());
        self.finish(recorder, end, report, events.as_ref())
    }

    fn run_stages(
        &self,
        tree: &ConfigTree,
        options: &DeployOptions,
        report: &ValidationReport,
        recorder: &mut DeploymentRecorder,
        run_id: &str,
        events: &dyn DeployEventSink,
    ) -> RunEnd {
        if !report.is_valid() {
            tracing::info!(errors = report.errors().len(), "validation failed");
            return RunEnd::new(DeploymentStatus::ValidationFailed)
                .because(format!("{} validation error(s)", report.errors().len()));
        }

        if self.cancel.is_cancelled() {
            return RunEnd::new(DeploymentStatus::Cancelled).because("cancelled before host check");
        }

        if let Some(end) = self.host_check(tree, options, recorder, run_id, events) {
            return end;
        }

        if self.cancel.is_cancelled() {
            return RunEnd::new(DeploymentStatus::Cancelled).because("cancelled before sync");
        }

        let manifest = match self.transport.list_manifest(&options.scope) {
            Ok(manifest) => manifest,
            Err(err) => {
                tracing::error!(error = %err, "could not read host manifest");
                return RunEnd::new(DeploymentStatus::TransportFailure).because(err.to_string());
            }
        };

        let plan = SyncPlanner::plan(tree, &manifest, &options.scope, &self.registry);
        recorder.record_plan(plan.len());
        events.on_event(DeployEvent::Planned {
            creates: plan.create_count(),
            updates: plan.update_count(),
            deletes: plan.delete_count(),
        });
        tracing::info!(
            creates = plan.create_count(),
            updates = plan.update_count(),
            deletes = plan.delete_count(),
            "sync planned"
        );

        if options.dry_run {
            recorder.record_sync(Vec::new(), plan.operations().to_vec());
            return RunEnd::new(DeploymentStatus::Planned).with_plan(plan);
        }

        if plan.is_empty() {
            return self.reload_after(options, false, recorder, events, plan);
        }

        if !self
            .approver
            .approve(&self.transport.describe(), plan.operations())
        {
            recorder.record_sync(Vec::new(), plan.operations().to_vec());
            return RunEnd::new(DeploymentStatus::Cancelled)
                .because("plan not approved")
                .with_plan(plan);
        }

        if self.cancel.is_cancelled() {
            recorder.record_sync(Vec::new(), plan.operations().to_vec());
            return RunEnd::new(DeploymentStatus::Cancelled)
                .because("cancelled before sync")
                .with_plan(plan);
        }

        let synchronizer = TreeSynchronizer::new(self.transport.as_ref(), options.sync_budget);
        match synchronizer.apply(tree, &plan, events) {
            SyncOutcome::Complete { applied } => {
                recorder.record_sync(applied, Vec::new());
                self.reload_after(options, true, recorder, events, plan)
            }
            SyncOutcome::Partial {
                completed,
                remaining,
                reason,
            } => {
                recorder.record_sync(completed, remaining);
                RunEnd::new(DeploymentStatus::PartialSync)
                    .because(reason)
                    .with_plan(plan)
            }
        }
    }

    /// Run the host check. Returns `Some` when the run must stop.
    fn host_check(
        &self,
        tree: &ConfigTree,
        options: &DeployOptions,
        recorder: &mut DeploymentRecorder,
        run_id: &str,
        events: &dyn DeployEventSink,
    ) -> Option<RunEnd> {
        if options.host_check == HostCheckMode::Off {
            recorder.record_host_check(HostCheckSummary::Skipped);
            return None;
        }

        let verdict = HostChecker::new(
            self.transport.as_ref(),
            self.runtime.as_ref(),
            options.host_check_timeout,
        )
        .with_command_timeout(options.command_timeout)
        .check(tree, run_id);

        recorder.record_host_check(verdict.summary());
        events.on_event(DeployEvent::HostChecked {
            outcome: verdict.summary(),
        });

        match verdict {
            HostCheckVerdict::Pass => None,
            HostCheckVerdict::Fail { details } => {
                Some(RunEnd::new(DeploymentStatus::HostCheckFailed).because(details))
            }
            HostCheckVerdict::Unreachable { reason } => {
                if options.host_check == HostCheckMode::Required {
                    Some(
                        RunEnd::new(DeploymentStatus::HostCheckFailed)
                            .because(format!("host check required but host unreachable: {}", reason)),
                    )
                } else {
                    tracing::warn!(%reason, "host check unavailable; continuing with local validation only");
                    None
                }
            }
        }
    }

    fn reload_after(
        &self,
        options: &DeployOptions,
        changed: bool,
        recorder: &mut DeploymentRecorder,
        events: &dyn DeployEventSink,
        plan: SyncPlan,
    ) -> RunEnd {
        let settled = if changed {
            DeploymentStatus::Deployed
        } else {
            DeploymentStatus::NoChanges
        };

        if !options.reload_policy.should_reload(changed) {
            return RunEnd::new(settled).with_plan(plan);
        }

        let mut orchestrator =
            ReloadOrchestrator::new(self.runtime.as_ref(), options.health, self.pause.as_ref());
        let outcome = orchestrator.run(events);
        let end = if outcome.is_healthy() {
            RunEnd::new(settled)
        } else {
            let reason = match &outcome {
                ReloadOutcome::Unhealthy { attempts, reason } => {
                    format!("host unhealthy after {} health probe(s): {}", attempts, reason)
                }
                ReloadOutcome::ReloadFailed { reason } => {
                    format!("reload failed: {}", reason)
                }
                _ => String::new(),
            };
            RunEnd::new(DeploymentStatus::DeployedButUnhealthy).because(reason)
        };
        recorder.record_reload(outcome);
        end.with_plan(plan)
    }

    fn finish(
        &self,
        recorder: DeploymentRecorder,
        end: RunEnd,
        report: ValidationReport,
        events: &dyn DeployEventSink,
    ) -> DeployOutcome {
        let result = recorder.finish(end.status, end.reason);

        events.on_event(DeployEvent::Completed {
            status: result.status(),
            completed: result.completed().len(),
            remaining: result.remaining().len(),
        });

        let audit_error = match self.audit.append(&result) {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(error = %err, "failed to append deployment record");
                Some(err.to_string())
            }
        };

        tracing::info!(status = %result.status(), "run finished");

        DeployOutcome {
            result,
            report,
            plan: end.plan,
            audit_error,
        }
    }
}
