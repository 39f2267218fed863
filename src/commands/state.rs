use anyhow::Result;
use serde_json::json;

use hapsync::domain::value_objects::EntityClassification;

use crate::commands::Session;
use crate::ui::json::emit;
use crate::ui::views::state::{render_registry, render_state_header, render_verification};

pub fn cmd_state(
    session: &Session,
    class: Option<EntityClassification>,
    verify: bool,
) -> Result<i32> {
    let ui = session.ui;
    let registry = session.registry()?;

    if !verify {
        if ui.json {
            for entity in registry
                .iter()
                .filter(|e| class.map_or(true, |c| c == e.classification))
            {
                emit("state", json!({"event": "entity", "entity": entity}))?;
            }
        } else {
            print!("{}", render_state_header(ui.color, ui.unicode));
            println!();
            print!("{}", render_registry(&registry, class, ui.color));
        }
        return Ok(0);
    }

    let tree = session.load_tree()?;
    let missing = registry.verify_tree(&tree);
    let misplaced: Vec<(String, String)> = tree
        .paths()
        .filter_map(|path| {
            registry
                .opaque_match(path)
                .map(|entity| (path.to_string(), entity.name.clone()))
        })
        .collect();
    let clean = missing.is_empty() && misplaced.is_empty();
    tracing::info!(
        missing = missing.len(),
        misplaced = misplaced.len(),
        "registry verification"
    );

    if ui.json {
        for entity in &missing {
            emit(
                "state",
                json!({"event": "missing", "entity": entity.name, "paths": entity.paths}),
            )?;
        }
        for (path, entity) in &misplaced {
            emit(
                "state",
                json!({"event": "opaque_in_tree", "path": path, "entity": entity}),
            )?;
        }
        emit("state", json!({"event": "verified", "success": clean}))?;
    } else {
        print!("{}", render_state_header(ui.color, ui.unicode));
        println!();
        print!(
            "{}",
            render_verification(&missing, &misplaced, ui.color, ui.unicode)
        );
    }

    Ok(if clean { 0 } else { 1 })
}
