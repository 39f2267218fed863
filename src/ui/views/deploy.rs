use std::path::Path;

use hapsync::application::DeployOutcome;
use hapsync::domain::entities::{DeploymentStatus, ReloadOutcome};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::primitives::icon::Icon;
use crate::ui::views::validation::describe_host_check;

pub fn render_deploy_header(
    source: &Path,
    destination: &str,
    modes: &[&str],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Deploy, "hapsync deploy");
    header.add("Source", source.display().to_string());
    header.add("Host", destination);
    for mode in modes {
        header.add("Mode", *mode);
    }
    header.render(supports_color, supports_unicode)
}

pub fn describe_reload(outcome: &ReloadOutcome) -> String {
    match outcome {
        ReloadOutcome::NotTriggered => "not triggered".to_string(),
        ReloadOutcome::Healthy { attempts } => format!("healthy after {} probe(s)", attempts),
        ReloadOutcome::Unhealthy { attempts, reason } => {
            format!("unhealthy after {} probe(s): {}", attempts, reason)
        }
        ReloadOutcome::ReloadFailed { reason } => format!("reload failed: {}", reason),
    }
}

fn title_for(status: DeploymentStatus) -> &'static str {
    match status {
        DeploymentStatus::Deployed => "Deployed",
        DeploymentStatus::NoChanges => "Host already up to date",
        DeploymentStatus::Planned => "Dry run complete",
        DeploymentStatus::ValidationFailed => "Validation failed",
        DeploymentStatus::HostCheckFailed => "Host check failed",
        DeploymentStatus::TransportFailure => "Host unreachable",
        DeploymentStatus::PartialSync => "Sync stopped part-way",
        DeploymentStatus::DeployedButUnhealthy => "Deployed, but the host is unhealthy",
        DeploymentStatus::Cancelled => "Cancelled",
    }
}

fn next_step_for(status: DeploymentStatus) -> Option<&'static str> {
    match status {
        DeploymentStatus::Planned => Some("Run `hapsync deploy` without --dry-run to apply"),
        DeploymentStatus::ValidationFailed => Some("Fix the errors above; the host was not touched"),
        DeploymentStatus::HostCheckFailed => Some("The host rejected the tree; nothing was synced"),
        DeploymentStatus::TransportFailure | DeploymentStatus::PartialSync => {
            Some("Rerun `hapsync deploy` once the host is reachable")
        }
        DeploymentStatus::DeployedButUnhealthy => Some(
            "Redeploy the last good tree (`hapsync history --last-success`) or fix forward",
        ),
        _ => None,
    }
}

pub fn render_deploy_result(
    outcome: &DeployOutcome,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let result = &outcome.result;
    let status = result.status();
    let title = title_for(status);

    let mut summary = match status {
        DeploymentStatus::Deployed | DeploymentStatus::NoChanges => ResultSummary::success(title),
        DeploymentStatus::Planned | DeploymentStatus::Cancelled => ResultSummary::partial(title),
        _ => ResultSummary::failure(title),
    };

    if result.plan_size() > 0 {
        summary.add_stat("applied", result.completed().len());
        summary.add_stat("remaining", result.remaining().len());
    }

    if let Some(reason) = result.failure_reason() {
        summary.add_warning(reason);
    }
    if result.is_degraded() {
        summary.add_warning(format!(
            "host check {}; only local validation gated this run",
            describe_host_check(result.host_check())
        ));
    }
    if !matches!(result.reload(), ReloadOutcome::NotTriggered) {
        summary.add_warning(format!("reload {}", describe_reload(result.reload())))
    }
    if let Some(err) = &outcome.audit_error {
        summary.add_warning(format!("audit log not written: {}", err));
    }
    if let Some(step) = next_step_for(status) {
        summary.with_next_step(step);
    }

    summary.render(supports_color, supports_unicode)
}
