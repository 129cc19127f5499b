use std::path::Path;

use ar_core::{FrameGraph, GraphConfig, ReferenceFrame};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path, max_depth: Option<usize>) -> Result<(), String> {
    let scene = super::load_scene(path)?;

    let mut config = GraphConfig::default();
    if let Some(depth) = max_depth {
        config = config.with_max_depth(depth);
    }
    let graph = FrameGraph::with_config(&scene, config);

    let mut entities: Vec<_> = scene.all_entities().collect();
    entities.sort_by_key(|e| e.name.to_lowercase());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Entity", "Parent", "Root", "Depth"]);

    let mut broken = Vec::new();
    for entity in &entities {
        let parent = entity
            .parent
            .map(|p| super::frame_label(&scene, p))
            .unwrap_or_else(|| "—".to_string());

        match graph.ancestor_reference_frames(entity.id) {
            Ok(frames) => {
                let root = frames
                    .first()
                    .copied()
                    .unwrap_or(ReferenceFrame::Entity(entity.id));
                table.add_row(vec![
                    entity.name.clone(),
                    parent,
                    super::frame_label(&scene, root),
                    frames.len().to_string(),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    entity.name.clone(),
                    parent,
                    "error".to_string(),
                    "—".to_string(),
                ]);
                broken.push((entity.name.clone(), e));
            }
        }
    }

    println!("{table}");
    println!();

    if broken.is_empty() {
        println!("  All frame chains resolved for '{}'.", scene.name);
        println!("  {} entities", entities.len());
        return Ok(());
    }

    for (name, error) in &broken {
        eprintln!("  {} {name}: {error}", "broken:".red().bold());
    }
    Err(format!(
        "{} entit{} with broken frame chains",
        broken.len(),
        if broken.len() == 1 { "y" } else { "ies" }
    ))
}
