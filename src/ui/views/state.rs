use hapsync::domain::entities::{EntityDefinition, StateRegistry};
use hapsync::domain::value_objects::EntityClassification;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_state_header(supports_color: bool, supports_unicode: bool) -> String {
    CommandHeader::new(Icon::State, "hapsync state").render(supports_color, supports_unicode)
}

fn heading(classification: EntityClassification) -> &'static str {
    match classification {
        EntityClassification::Managed => "Managed (restored by redeploying the tree)",
        EntityClassification::BootstrapState => "Bootstrap state (one-time manual setup)",
        EntityClassification::OpaqueState => "Opaque state (runtime only, never restorable)",
    }
}

/// Registry grouped by classification; `only` narrows to one class
pub fn render_registry(
    registry: &StateRegistry,
    only: Option<EntityClassification>,
    supports_color: bool,
) -> String {
    let mut out = String::new();
    for classification in EntityClassification::ALL {
        if only.is_some_and(|c| c != classification) {
            continue;
        }
        let mut entities: Vec<&EntityDefinition> = registry
            .iter()
            .filter(|e| e.classification == classification)
            .collect();
        if entities.is_empty() {
            continue;
        }
        entities.sort_by(|a, b| a.name.cmp(&b.name));

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&ColoredText::info(heading(classification)).bold().render(supports_color));
        out.push('\n');
        for entity in entities {
            out.push_str(&format!("  {}", entity.name));
            if !entity.description.is_empty() {
                out.push_str(&format!(
                    " {}",
                    ColoredText::dim(format!("- {}", entity.description)).render(supports_color)
                ));
            }
            out.push('\n');
            if !entity.paths.is_empty() {
                out.push_str(&format!("      {}\n", entity.paths.join(", ")));
            }
        }
    }
    out
}

/// Findings of `state --verify`
pub fn render_verification(
    missing: &[&EntityDefinition],
    misplaced: &[(String, String)],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = String::new();
    if missing.is_empty() && misplaced.is_empty() {
        out.push_str(&format!(
            "{} Tree covers every managed entity; no runtime state committed\n",
            Icon::Success.colored(supports_color, supports_unicode)
        ));
        return out;
    }

    for entity in missing {
        out.push_str(&format!(
            "{} managed entity '{}' has no file in the tree ({})\n",
            Icon::Warning.colored(supports_color, supports_unicode),
            entity.name,
            entity.paths.join(", ")
        ));
    }
    for (path, entity) in misplaced {
        out.push_str(&format!(
            "{} {} is runtime state ({}) and must not be committed\n",
            Icon::Error.colored(supports_color, supports_unicode),
            path,
            entity
        ));
    }
    out
}
