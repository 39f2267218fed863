use hapsync::domain::entities::DeploymentResult;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_history_header(
    audit_path: &str,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::History, "hapsync history");
    header.add("Audit log", audit_path);
    header.render(supports_color, supports_unicode)
}

/// One line per run, newest first
pub fn render_history(
    entries: &[DeploymentResult],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if entries.is_empty() {
        return "No deployments recorded\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let status = entry.status();
        let icon = if status.is_known_good() {
            Icon::Success
        } else if status.is_success() {
            Icon::Pending
        } else {
            Icon::Error
        };
        out.push_str(&format!(
            "{} {}  {:<22}  {}  {}",
            icon.colored(supports_color, supports_unicode),
            entry.started_at().format("%Y-%m-%d %H:%M:%S"),
            status.as_str(),
            entry.tree_digest().short(),
            entry.source_revision().unwrap_or("-"),
        ));
        if entry.plan_size() > 0 {
            out.push_str(&format!(
                "  {}/{} applied",
                entry.completed().len(),
                entry.plan_size()
            ));
        }
        out.push('\n');
        if let Some(reason) = entry.failure_reason() {
            out.push_str(&format!(
                "    {}\n",
                ColoredText::dim(reason).render(supports_color)
            ));
        }
    }
    out
}

/// Details of the run `history --last-success` selects
pub fn render_last_success(entry: &DeploymentResult, supports_color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        ColoredText::success("Last known good deployment")
            .bold()
            .render(supports_color)
    ));
    out.push_str(&format!("  id:          {}\n", entry.id()));
    out.push_str(&format!(
        "  finished:    {}\n",
        entry.finished_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("  host:        {}\n", entry.destination()));
    out.push_str(&format!("  tree digest: {}\n", entry.tree_digest()));
    out.push_str(&format!(
        "  revision:    {}\n",
        entry.source_revision().unwrap_or("(not a git checkout)")
    ));
    out
}
