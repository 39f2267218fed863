//! Deploy Use Case Tests

use super::*;
use crate::application::cancel::CancelToken;
use crate::application::host_check::HostCheckMode;
use crate::application::reload::{HealthPolicy, Pause, ReloadPolicy};
use crate::config::Config;
use crate::domain::entities::{
    ConfigFile, ConfigTree, DeploymentStatus, HostCheckSummary, ReloadOutcome, StateRegistry,
};
use crate::domain::ports::{
    AuditLog, DeployEvent, DeployEventSink, HostRuntime, HostTransport, PlanApprover,
    RuntimeError,
};
use crate::domain::value_objects::{ManagedScope, SyncOpKind, SyncOperation};
use crate::infrastructure::{MemoryAuditLog, MemoryTransport, TransportCall};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// Test doubles

#[derive(Clone, Copy)]
enum CheckScript {
    Pass,
    Reject,
    Timeout,
    Unreachable,
}

struct ScriptedRuntime {
    check: CheckScript,
    reload_ok: bool,
    healthy: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedRuntime {
    fn healthy() -> Self {
        Self {
            check: CheckScript::Pass,
            reload_ok: true,
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_check(mut self, check: CheckScript) -> Self {
        self.check = check;
        self
    }

    fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    fn failing_reload(mut self) -> Self {
        self.reload_ok = false;
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl HostRuntime for ScriptedRuntime {
    fn check_config(&self, _staged_dir: &str, timeout: Duration) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push("check");
        match self.check {
            CheckScript::Pass => Ok(()),
            CheckScript::Reject => Err(RuntimeError::Rejected {
                details: "Invalid config for [automation]: required key 'trigger'".into(),
            }),
            CheckScript::Timeout => Err(RuntimeError::TimedOut {
                secs: timeout.as_secs(),
            }),
            CheckScript::Unreachable => Err(RuntimeError::Unreachable("no route to host".into())),
        }
    }

    fn reload(&self) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push("reload");
        if self.reload_ok {
            Ok(())
        } else {
            Err(RuntimeError::Rejected {
                details: "reload refused".into(),
            })
        }
    }

    fn health(&self) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push("health");
        if self.healthy {
            Ok(())
        } else {
            Err(RuntimeError::Rejected {
                details: "502 Bad Gateway".into(),
            })
        }
    }
}

struct NoPause;

impl Pause for NoPause {
    fn pause(&self, _duration: Duration) {}
}

struct Reject;

impl PlanApprover for Reject {
    fn approve(&self, _destination: &str, _operations: &[SyncOperation]) -> bool {
        false
    }
}

/// Cancels the run the moment the plan is computed
struct CancelOnPlan(CancelToken);

impl DeployEventSink for CancelOnPlan {
    fn on_event(&self, event: DeployEvent) {
        if matches!(event, DeployEvent::Planned { .. }) {
            self.0.cancel();
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// Fixtures

fn valid_files() -> Vec<ConfigFile> {
    vec![
        ConfigFile::new(
            "configuration.yaml",
            "homeassistant:\n  name: Home\nautomation: !include automations.yaml\n",
        ),
        ConfigFile::new("automations.yaml", "- alias: Lights on\n  trigger: []\n"),
        ConfigFile::new("scripts.yaml", "{}\n"),
        ConfigFile::new("scenes.yaml", "[]\n"),
        ConfigFile::new("packages/lights.yaml", "light: []\n"),
    ]
}

fn tree_of(files: Vec<ConfigFile>) -> ConfigTree {
    ConfigTree::from_files("config", files, None).unwrap()
}

fn valid_tree() -> ConfigTree {
    tree_of(valid_files())
}

fn options() -> DeployOptions {
    DeployOptions::new(ManagedScope::everything()).with_health(HealthPolicy {
        retries: 3,
        backoff: Duration::from_millis(1),
    })
}

struct Harness {
    transport: MemoryTransport,
    runtime: Arc<ScriptedRuntime>,
    audit: MemoryAuditLog,
}

impl Harness {
    fn new() -> Self {
        Self::with_runtime(ScriptedRuntime::healthy())
    }

    fn with_runtime(runtime: ScriptedRuntime) -> Self {
        Self {
            transport: MemoryTransport::new(),
            runtime: Arc::new(runtime),
            audit: MemoryAuditLog::new(),
        }
    }

    fn use_case(&self) -> DeployUseCase {
        DeployUseCase::new(
            Arc::new(self.transport.clone()),
            self.runtime.clone(),
            Arc::new(self.audit.clone()),
            StateRegistry::builtin(),
        )
        .with_pause(Arc::new(NoPause))
    }

    fn deploy(&self, tree: &ConfigTree, options: &DeployOptions) -> DeployOutcome {
        self.use_case().execute(tree, options)
    }
}

// Validation gate

#[test]
fn schema_violation_halts_before_any_host_contact() {
    let h = Harness::new();
    let mut files = valid_files();
    files[0] = ConfigFile::new("configuration.yaml", "name: Home\n");
    let tree = tree_of(files);

    let outcome = h.deploy(&tree, &options());

    assert_eq!(outcome.status(), DeploymentStatus::ValidationFailed);
    assert!(!outcome.report.is_valid());
    assert!(h.transport.calls().is_empty());
    assert!(h.runtime.calls().is_empty());
    assert!(outcome.plan.is_none());
}

#[test]
fn validation_failure_is_still_recorded() {
    let h = Harness::new();
    let tree = tree_of(vec![ConfigFile::new(
        "configuration.yaml",
        "homeassistant:\n  name: [unclosed\n",
    )]);

    let outcome = h.deploy(&tree, &options());

    assert_eq!(outcome.status(), DeploymentStatus::ValidationFailed);
    let entries = h.audit.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), DeploymentStatus::ValidationFailed);
    assert_eq!(entries[0].validation().errors, outcome.report.errors().len());
}

// Host check

#[test]
fn host_check_rejection_halts_without_live_changes() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().with_check(CheckScript::Reject));

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::HostCheckFailed);
    assert!(outcome
        .result
        .failure_reason()
        .unwrap()
        .contains("required key 'trigger'"));
    assert!(h.transport.live_mutations().is_empty());
    assert!(!h.runtime.calls().contains(&"reload"));
}

#[test]
fn host_check_timeout_counts_as_failure() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().with_check(CheckScript::Timeout));

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::HostCheckFailed);
    assert!(matches!(
        outcome.result.host_check(),
        HostCheckSummary::Failed { .. }
    ));
}

#[test]
fn unreachable_check_degrades_and_proceeds() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().with_check(CheckScript::Unreachable));

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert!(outcome.result.is_degraded());
    assert_eq!(h.transport.paths().len(), 5);
}

#[test]
fn unreachable_check_fails_when_required() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().with_check(CheckScript::Unreachable));

    let outcome = h.deploy(
        &valid_tree(),
        &options().with_host_check(HostCheckMode::Required),
    );

    assert_eq!(outcome.status(), DeploymentStatus::HostCheckFailed);
    assert!(h.transport.live_mutations().is_empty());
}

#[test]
fn skipped_host_check_never_stages() {
    let h = Harness::new();

    let outcome = h.deploy(&valid_tree(), &options().with_host_check(HostCheckMode::Off));

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert_eq!(outcome.result.host_check(), &HostCheckSummary::Skipped);
    assert!(!h.runtime.calls().contains(&"check"));
    assert!(h
        .transport
        .calls()
        .iter()
        .all(|c| !matches!(c, TransportCall::Upload(p) if p.starts_with(".hapsync-staging"))));
}

#[test]
fn staging_is_cleaned_up_after_check() {
    let h = Harness::new();

    h.deploy(&valid_tree(), &options());

    assert!(h
        .transport
        .calls()
        .iter()
        .any(|c| matches!(c, TransportCall::Execute(cmd) if cmd.starts_with("rm -rf") && cmd.contains(".hapsync-staging"))));
}

// Sync

#[test]
fn first_deploy_creates_everything_then_reloads() {
    let h = Harness::new();

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert_eq!(outcome.result.completed().len(), 5);
    assert!(outcome.result.remaining().is_empty());
    assert!(outcome
        .result
        .completed()
        .iter()
        .all(|op| op.kind == SyncOpKind::Create));
    assert!(matches!(
        outcome.result.reload(),
        ReloadOutcome::Healthy { attempts: 1 }
    ));
    assert_eq!(
        h.transport.file("scripts.yaml").as_deref(),
        Some(b"{}\n".as_slice())
    );
}

#[test]
fn second_run_has_nothing_to_do() {
    let h = Harness::new();
    let tree = valid_tree();
    h.deploy(&tree, &options());
    h.transport.clear_calls();

    let outcome = h.deploy(&tree, &options());

    assert_eq!(outcome.status(), DeploymentStatus::NoChanges);
    assert_eq!(outcome.result.plan_size(), 0);
    assert!(h.transport.live_mutations().is_empty());
    assert_eq!(outcome.result.reload(), &ReloadOutcome::NotTriggered);
}

#[test]
fn stale_host_files_are_deleted_inside_scope_only() {
    let h = Harness::new();
    h.transport.upload("old_package.yaml", b"x: 1\n").unwrap();
    h.transport
        .upload(".storage/core.entity_registry", b"{}")
        .unwrap();
    h.transport.clear_calls();
    let scope = ManagedScope::new([
        "configuration.yaml",
        "automations.yaml",
        "scripts.yaml",
        "scenes.yaml",
        "packages/",
        "old_package.yaml",
    ])
    .unwrap();

    let outcome = h.deploy(&valid_tree(), &DeployOptions::new(scope));

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert!(h.transport.file("old_package.yaml").is_none());
    assert!(h.transport.file(".storage/core.entity_registry").is_some());
}

#[test]
fn default_config_never_deletes_secrets_or_runtime_state() {
    let h = Harness::new();
    h.transport.upload("secrets.yaml", b"wifi: hunter2\n").unwrap();
    h.transport
        .upload(".storage/core.entity_registry", b"{}")
        .unwrap();
    h.transport
        .upload(".storage/core.config_entries", b"{}")
        .unwrap();
    h.transport.upload("home-assistant_v2.db", b"sqlite").unwrap();
    h.transport.upload(".HA_VERSION", b"2024.6.0").unwrap();
    h.transport.upload("packages/retired.yaml", b"x: 1\n").unwrap();
    h.transport.clear_calls();

    let options = Config::default().deploy_options().unwrap();
    let outcome = h.deploy(&valid_tree(), &options);

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    let deleted: Vec<_> = h
        .transport
        .live_mutations()
        .into_iter()
        .filter_map(|call| match call {
            TransportCall::Delete(path) => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(deleted, vec!["packages/retired.yaml".to_string()]);
    assert_eq!(h.transport.file("secrets.yaml"), Some(b"wifi: hunter2\n".to_vec()));
    for kept in [
        ".storage/core.entity_registry",
        ".storage/core.config_entries",
        "home-assistant_v2.db",
        ".HA_VERSION",
    ] {
        assert!(h.transport.file(kept).is_some(), "{} was removed", kept);
    }
}

#[test]
fn partial_sync_reports_remaining_and_rerun_finishes_exactly_those() {
    let h = Harness::new();
    let tree = valid_tree();
    h.transport.fail_after(2);

    let first = h.deploy(&tree, &options());

    assert_eq!(first.status(), DeploymentStatus::PartialSync);
    assert_eq!(first.result.completed().len(), 2);
    assert_eq!(first.result.remaining().len(), 3);
    assert!(!h.runtime.calls().contains(&"reload"));

    h.transport.heal();
    h.transport.clear_calls();
    let second = h.deploy(&tree, &options());

    assert_eq!(second.status(), DeploymentStatus::Deployed);
    assert_eq!(second.result.plan_size(), 3);
    let applied: Vec<&str> = second
        .result
        .completed()
        .iter()
        .map(|op| op.path.as_str())
        .collect();
    let expected: Vec<&str> = first
        .result
        .remaining()
        .iter()
        .map(|op| op.path.as_str())
        .collect();
    assert_eq!(applied, expected);
    assert_eq!(h.transport.live_mutations().len(), 3);
}

#[test]
fn unreachable_host_during_listing_is_transport_failure() {
    let h = Harness::new();
    h.transport.set_unreachable(true);

    let outcome = h.deploy(&valid_tree(), &options().with_host_check(HostCheckMode::Off));

    assert_eq!(outcome.status(), DeploymentStatus::TransportFailure);
    assert!(outcome.plan.is_none());
}

// Dry run and approval

#[test]
fn dry_run_plans_without_applying() {
    let h = Harness::new();

    let outcome = h.deploy(&valid_tree(), &options().with_dry_run(true));

    assert_eq!(outcome.status(), DeploymentStatus::Planned);
    assert!(outcome.is_success());
    assert_eq!(outcome.plan.as_ref().unwrap().len(), 5);
    assert_eq!(outcome.result.remaining().len(), 5);
    assert!(h.transport.live_mutations().is_empty());
    assert!(!h.runtime.calls().contains(&"reload"));
}

#[test]
fn rejected_plan_is_cancelled() {
    let h = Harness::new();
    let use_case = h.use_case().with_approver(Arc::new(Reject));

    let outcome = use_case.execute(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::Cancelled);
    assert!(h.transport.live_mutations().is_empty());
}

#[test]
fn cancellation_before_apply_is_honoured() {
    let h = Harness::new();
    let token = CancelToken::new();
    let use_case = h.use_case().with_cancel_token(token.clone());

    let outcome = use_case.execute_with_events(
        &valid_tree(),
        &options(),
        Arc::new(CancelOnPlan(token)),
    );

    assert_eq!(outcome.status(), DeploymentStatus::Cancelled);
    assert_eq!(outcome.result.remaining().len(), 5);
    assert!(h.transport.live_mutations().is_empty());
}

// Reload

#[test]
fn unhealthy_host_after_reload() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().unhealthy());

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::DeployedButUnhealthy);
    assert!(matches!(
        outcome.result.reload(),
        ReloadOutcome::Unhealthy { attempts: 3, .. }
    ));
    assert_eq!(h.transport.paths().len(), 5);
}

#[test]
fn failed_reload_leaves_files_in_place() {
    let h = Harness::with_runtime(ScriptedRuntime::healthy().failing_reload());

    let outcome = h.deploy(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::DeployedButUnhealthy);
    assert!(matches!(
        outcome.result.reload(),
        ReloadOutcome::ReloadFailed { .. }
    ));
    assert!(!h.runtime.calls().contains(&"health"));
    assert_eq!(h.transport.paths().len(), 5);
}

#[test]
fn reload_policy_never_skips_reload() {
    let h = Harness::new();

    let outcome = h.deploy(
        &valid_tree(),
        &options().with_reload_policy(ReloadPolicy::Never),
    );

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert_eq!(outcome.result.reload(), &ReloadOutcome::NotTriggered);
    assert!(!h.runtime.calls().contains(&"reload"));
}

#[test]
fn reload_policy_always_reloads_unchanged_tree() {
    let h = Harness::new();
    let tree = valid_tree();
    h.deploy(&tree, &options());

    let outcome = h.deploy(&tree, &options().with_reload_policy(ReloadPolicy::Always));

    assert_eq!(outcome.status(), DeploymentStatus::NoChanges);
    assert!(matches!(
        outcome.result.reload(),
        ReloadOutcome::Healthy { .. }
    ));
}

// Audit and events

#[test]
fn audit_failure_does_not_change_status() {
    let h = Harness::new();
    let use_case = DeployUseCase::new(
        Arc::new(h.transport.clone()),
        h.runtime.clone(),
        Arc::new(MemoryAuditLog::read_only()),
        StateRegistry::builtin(),
    )
    .with_pause(Arc::new(NoPause));

    let outcome = use_case.execute(&valid_tree(), &options());

    assert_eq!(outcome.status(), DeploymentStatus::Deployed);
    assert!(outcome.audit_error.is_some());
}

#[test]
fn every_run_records_exactly_one_result() {
    let h = Harness::new();
    let tree = valid_tree();
    h.deploy(&tree, &options());
    h.deploy(&tree, &options().with_dry_run(true));
    h.deploy(&tree, &options());

    let entries = h.audit.entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.iter().map(|e| e.status()).collect::<Vec<_>>(),
        vec![
            DeploymentStatus::Deployed,
            DeploymentStatus::Planned,
            DeploymentStatus::NoChanges
        ]
    );
    assert_eq!(h.audit.last_successful().unwrap().unwrap().id(), entries[2].id());
}

#[test]
fn events_bracket_the_run() {
    let h = Harness::new();
    let sink = Arc::new(RecordingSink::default());

    h.use_case()
        .execute_with_events(&valid_tree(), &options(), sink.clone());

    let events = sink.events.lock().unwrap();
    assert!(matches!(events.first(), Some(DeployEvent::Started { file_count: 5, .. })));
    assert!(matches!(
        events.last(),
        Some(DeployEvent::Completed {
            status: DeploymentStatus::Deployed,
            completed: 5,
            remaining: 0
        })
    ));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DeployEvent::OperationApplied { .. }))
            .count(),
        5
    );
}

#[test]
fn source_revision_and_digest_are_recorded() {
    let h = Harness::new();
    let tree = valid_tree();

    let outcome = h.deploy(
        &tree,
        &options().with_source_revision(Some("4f2a9c1".to_string())),
    );

    assert_eq!(outcome.result.source_revision(), Some("4f2a9c1"));
    assert_eq!(outcome.result.tree_digest(), &tree.digest());
    assert_eq!(outcome.result.destination(), "memory:/config");
}
