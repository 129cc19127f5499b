pub mod ancestors;
pub mod check;
pub mod pose;
pub mod root;
pub mod url;

use std::path::Path;

use ar_core::document::SceneDocument;
use ar_core::{EntityId, ReferenceFrame, Scene};

/// Read and build a scene file.
fn load_scene(path: &Path) -> Result<Scene, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let scene = SceneDocument::from_json(&text)
        .and_then(SceneDocument::into_scene)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::debug!(scene = %scene.name, entities = scene.entity_count(), "loaded scene");
    Ok(scene)
}

/// Look up an entity by name.
fn find_entity(scene: &Scene, name: &str) -> Result<EntityId, String> {
    scene
        .find_id_by_name(name)
        .ok_or_else(|| format!("entity not found: \"{name}\""))
}

/// Human-readable frame name: fixed frame names, or the entity's name.
fn frame_label(scene: &Scene, frame: ReferenceFrame) -> String {
    match frame {
        ReferenceFrame::Fixed(fixed) => fixed.to_string(),
        ReferenceFrame::Entity(id) => scene.entity_name(id).to_string(),
    }
}
