use std::path::Path;

use hapsync::application::{CheckResult, CheckStatus, HostCheckMode};
use hapsync::domain::entities::{HostCheckSummary, Location};
use hapsync::domain::services::ValidationReport;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_check_header(
    source: &Path,
    destination: Option<&str>,
    mode: HostCheckMode,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Check, "hapsync check");
    header.add("Source", source.display().to_string());
    match destination {
        Some(dest) if mode != HostCheckMode::Off => {
            let mode = if mode == HostCheckMode::Required {
                "required"
            } else {
                "auto"
            };
            header.add("Host check", format!("{} ({})", dest, mode))
        }
        _ => header.add("Host check", "off"),
    }
    header.render(supports_color, supports_unicode)
}

/// One line per finding, errors first
pub fn render_validation_report(
    report: &ValidationReport,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = String::new();

    for error in report.errors() {
        out.push_str(&format!(
            "  {} {} {}: {}\n",
            Icon::Error.colored(supports_color, supports_unicode),
            position(&error.file, &error.location),
            ColoredText::error(error.kind.as_str()).render(supports_color),
            error.message
        ));
    }

    for warning in report.warnings() {
        out.push_str(&format!(
            "  {} {} {}: {}\n",
            Icon::Warning.colored(supports_color, supports_unicode),
            position(&warning.file, &warning.location),
            ColoredText::warning(warning.kind.as_str()).render(supports_color),
            warning.message
        ));
    }

    out
}

fn position(file: &str, location: &Location) -> String {
    let loc = location.to_string();
    match (location.line, loc.is_empty()) {
        (_, true) => file.to_string(),
        (Some(_), false) => format!("{}:{}", file, loc),
        (None, false) => format!("{} {}", file, loc),
    }
}

/// Human wording for a host check outcome
pub fn describe_host_check(summary: &HostCheckSummary) -> String {
    match summary {
        HostCheckSummary::Skipped => "skipped".to_string(),
        HostCheckSummary::Passed => "passed".to_string(),
        HostCheckSummary::Failed { details } => format!("failed: {}", details),
        HostCheckSummary::Unreachable { reason } => format!("unreachable: {}", reason),
    }
}

pub fn render_check_summary(
    result: &CheckResult,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut summary = match result.status {
        CheckStatus::Pass if result.report.warnings().is_empty() => {
            ResultSummary::success("All checks passed")
        }
        CheckStatus::Pass => ResultSummary::partial("Checks passed with warnings"),
        CheckStatus::Degraded => ResultSummary::partial("Local checks passed, host check unavailable"),
        CheckStatus::Fail => ResultSummary::failure("Check failed"),
    };

    summary.add_stat("files", result.report.files_checked());
    summary.add_stat("errors", result.report.errors().len());
    summary.add_stat("warnings", result.report.warnings().len());

    match &result.host_check {
        HostCheckSummary::Failed { .. } | HostCheckSummary::Unreachable { .. } => {
            summary.add_warning(format!("host check {}", describe_host_check(&result.host_check)))
        }
        _ => {}
    }

    if result.is_success() {
        summary.with_next_step("Run `hapsync plan` to preview the sync");
    }

    summary.render(supports_color, supports_unicode)
}
