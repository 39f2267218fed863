use hapsync::domain::services::SyncPlan;
use hapsync::domain::value_objects::{SyncOpKind, SyncOperation};

use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_plan_header(
    destination: &str,
    roots: &[String],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Plan, "hapsync plan");
    header.add("Host", destination);
    if roots.is_empty() {
        header.add("Managed roots", "(everything)");
    } else {
        header.add("Managed roots", roots.join(", "));
    }
    header.render(supports_color, supports_unicode)
}

/// One line per operation, in apply order
pub fn render_operations(operations: &[SyncOperation], supports_color: bool) -> String {
    let mut out = String::new();
    for op in operations {
        let marker = op.kind.symbol().to_string();
        let marker = match op.kind {
            SyncOpKind::Create => ColoredText::success(marker),
            SyncOpKind::Update => ColoredText::warning(marker),
            SyncOpKind::Delete => ColoredText::error(marker),
        };
        out.push_str(&format!("  {} {}\n", marker.render(supports_color), op.path));
    }
    out
}

pub fn render_plan_summary(
    plan: &SyncPlan,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if plan.is_empty() {
        return ResultSummary::success("Host already matches the tree")
            .render(supports_color, supports_unicode);
    }

    let mut summary = ResultSummary::partial(format!("{} change(s) pending", plan.len()));
    summary.add_stat("to create", plan.create_count());
    summary.add_stat("to update", plan.update_count());
    summary.add_stat("to delete", plan.delete_count());
    summary.with_next_step("Run `hapsync deploy` to apply");
    summary.render(supports_color, supports_unicode)
}
