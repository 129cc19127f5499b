use std::path::Path;

use ar_core::root_reference_frame;

pub fn run(path: &Path, name: &str) -> Result<(), String> {
    let scene = super::load_scene(path)?;
    let entity = super::find_entity(&scene, name)?;

    let root = root_reference_frame(&scene, entity).map_err(|e| e.to_string())?;
    println!("  {}", super::frame_label(&scene, root));

    Ok(())
}
