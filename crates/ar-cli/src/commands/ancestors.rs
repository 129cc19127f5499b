use std::path::Path;

use ar_core::ancestor_reference_frames;
use colored::Colorize;

pub fn run(path: &Path, name: &str) -> Result<(), String> {
    let scene = super::load_scene(path)?;
    let entity = super::find_entity(&scene, name)?;

    let frames = ancestor_reference_frames(&scene, entity).map_err(|e| e.to_string())?;
    if frames.is_empty() {
        println!("  '{}' has no ancestor frames.", scene.entity_name(entity));
        return Ok(());
    }

    for (depth, frame) in frames.iter().enumerate() {
        let label = super::frame_label(&scene, *frame);
        let label = if frame.is_fixed() {
            label.cyan().to_string()
        } else {
            label
        };
        println!("  {}{label}", "  ".repeat(depth));
    }
    println!(
        "  {}{}",
        "  ".repeat(frames.len()),
        scene.entity_name(entity).bold()
    );

    Ok(())
}
