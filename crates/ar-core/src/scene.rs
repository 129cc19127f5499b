use std::collections::HashMap;
use std::iter;

use crate::entity::{Cartesian3, EntityId, JulianDate, Quaternion};
use crate::error::{FrameError, FrameResult};
use crate::frame::ReferenceFrame;
use crate::graph::FrameGraph;
use crate::property::Property;
use crate::source::TransformSource;

/// An entity tracked by a [`Scene`].
#[derive(Debug, Clone)]
pub struct SceneEntity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Display name, unique within the scene (case-insensitive).
    pub name: String,
    /// The frame position and orientation are declared in.
    pub parent: Option<ReferenceFrame>,
    /// Position relative to `parent`.
    pub position: Option<Property<Cartesian3>>,
    /// Orientation relative to `parent`.
    pub orientation: Option<Property<Quaternion>>,
}

impl SceneEntity {
    /// Create a new entity with a random ID and no frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(EntityId::new(), name)
    }

    /// Create an entity with a pre-assigned ID.
    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            position: None,
            orientation: None,
        }
    }

    /// Set the parent frame.
    pub fn with_parent(mut self, parent: impl Into<ReferenceFrame>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the position property.
    pub fn with_position(mut self, position: Property<Cartesian3>) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the orientation property.
    pub fn with_orientation(mut self, orientation: Property<Quaternion>) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Rotation followed by translation, mapping child coordinates to parent coordinates.
#[derive(Debug, Clone, Copy)]
struct Rigid {
    translation: Cartesian3,
    rotation: Quaternion,
}

impl Rigid {
    const IDENTITY: Self = Self {
        translation: Cartesian3::ZERO,
        rotation: Quaternion::IDENTITY,
    };

    fn apply(&self, point: Cartesian3) -> Cartesian3 {
        self.translation + self.rotation * point
    }

    fn then(&self, child: Rigid) -> Rigid {
        Rigid {
            translation: self.apply(child.translation),
            rotation: self.rotation * child.rotation,
        }
    }

    fn inverse(&self) -> Rigid {
        let rotation = self.rotation.inverse();
        Rigid {
            translation: -(rotation * self.translation),
            rotation,
        }
    }
}

/// In-memory transform source. Owns entities and their frame links.
///
/// Transforms compose along parent chains. Two frames are mutually reachable
/// only if their chains end at the same root; converting between different
/// fixed frames is not supported.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Scene name.
    pub name: String,
    entities: HashMap<EntityId, SceneEntity>,

    // Indexes
    by_name_lower: HashMap<String, EntityId>,
    children: HashMap<EntityId, Vec<EntityId>>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: HashMap::new(),
            by_name_lower: HashMap::new(),
            children: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Entity CRUD
    // -----------------------------------------------------------------------

    /// Add an entity. Its parent entity, if any, must already exist.
    pub fn add_entity(&mut self, entity: SceneEntity) -> FrameResult<EntityId> {
        let name_lower = entity.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) {
            return Err(FrameError::DuplicateName(entity.name.clone()));
        }
        if let Some(ReferenceFrame::Entity(parent)) = entity.parent
            && !self.entities.contains_key(&parent)
        {
            return Err(FrameError::EntityNotFound(parent));
        }

        let id = entity.id;
        if let Some(ReferenceFrame::Entity(parent)) = entity.parent {
            self.children.entry(parent).or_default().push(id);
        }
        self.by_name_lower.insert(name_lower, id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Get a reference to an entity by ID.
    pub fn get_entity(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    ///
    /// Use [`Scene::set_parent`] to change the parent so the child index stays valid.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.entities.get_mut(&id)
    }

    /// Find an entity by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&SceneEntity> {
        self.by_name_lower
            .get(&name.to_lowercase())
            .and_then(|id| self.entities.get(id))
    }

    /// Find an entity ID by name (case-insensitive).
    pub fn find_id_by_name(&self, name: &str) -> Option<EntityId> {
        self.by_name_lower.get(&name.to_lowercase()).copied()
    }

    /// Display name for an entity, or `"unknown"`.
    pub fn entity_name(&self, id: EntityId) -> &str {
        self.entities
            .get(&id)
            .map(|e| e.name.as_str())
            .unwrap_or("unknown")
    }

    /// Re-parent an entity. Cycles are not rejected here; the frame walker
    /// reports them.
    pub fn set_parent(&mut self, id: EntityId, parent: Option<ReferenceFrame>) -> FrameResult<()> {
        if let Some(ReferenceFrame::Entity(p)) = parent
            && !self.entities.contains_key(&p)
        {
            return Err(FrameError::EntityNotFound(p));
        }
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(FrameError::EntityNotFound(id))?;
        let old = std::mem::replace(&mut entity.parent, parent);

        if let Some(ReferenceFrame::Entity(old_parent)) = old
            && let Some(ids) = self.children.get_mut(&old_parent)
        {
            ids.retain(|c| *c != id);
        }
        if let Some(ReferenceFrame::Entity(new_parent)) = parent {
            self.children.entry(new_parent).or_default().push(id);
        }
        Ok(())
    }

    /// Remove an entity. Its children are left without a parent frame.
    pub fn remove_entity(&mut self, id: EntityId) -> FrameResult<SceneEntity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(FrameError::EntityNotFound(id))?;

        self.by_name_lower.remove(&entity.name.to_lowercase());
        if let Some(ReferenceFrame::Entity(parent)) = entity.parent
            && let Some(ids) = self.children.get_mut(&parent)
        {
            ids.retain(|c| *c != id);
        }
        for child in self.children.remove(&id).unwrap_or_default() {
            if let Some(child) = self.entities.get_mut(&child) {
                child.parent = None;
            }
        }

        Ok(entity)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Entities whose parent frame is `id`.
    pub fn children_of(&self, id: EntityId) -> Vec<&SceneEntity> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.entities.get(c)).collect())
            .unwrap_or_default()
    }

    /// Get all entities.
    pub fn all_entities(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.values()
    }

    /// Number of entities in the scene.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    /// Transform of `id` relative to its parent at `time`.
    fn local_transform(&self, id: EntityId, time: JulianDate) -> Option<Rigid> {
        let entity = self.entities.get(&id)?;
        Some(Rigid {
            translation: entity.position.as_ref()?.value_at(time)?,
            rotation: entity.orientation.as_ref()?.value_at(time)?,
        })
    }

    /// The root of `frame` and the transform mapping `frame` coordinates to root coordinates.
    fn frame_to_root(&self, frame: ReferenceFrame, time: JulianDate) -> Option<(ReferenceFrame, Rigid)> {
        let id = match frame {
            ReferenceFrame::Fixed(_) => return Some((frame, Rigid::IDENTITY)),
            ReferenceFrame::Entity(id) => id,
        };
        if !self.entities.contains_key(&id) {
            return None;
        }

        let ancestors = FrameGraph::new(self).ancestor_reference_frames(id).ok()?;
        let Some(root) = ancestors.first().copied() else {
            return Some((frame, Rigid::IDENTITY));
        };

        let mut to_root = Rigid::IDENTITY;
        for link in ancestors.iter().skip(1).chain(iter::once(&frame)) {
            to_root = to_root.then(self.local_transform(link.entity()?, time)?);
        }
        Some((root, to_root))
    }

    /// Transform mapping coordinates in `from` to coordinates in `to`.
    fn frame_to_frame(&self, from: ReferenceFrame, to: ReferenceFrame, time: JulianDate) -> Option<Rigid> {
        let (from_root, from_to_root) = self.frame_to_root(from, time)?;
        let (to_root, to_to_root) = self.frame_to_root(to, time)?;
        if from_root != to_root {
            return None;
        }
        Some(to_to_root.inverse().then(from_to_root))
    }
}

impl TransformSource for Scene {
    fn parent_frame(&self, entity: EntityId) -> Option<ReferenceFrame> {
        self.entities.get(&entity)?.parent
    }

    fn position(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Cartesian3> {
        let declared = self.entities.get(&entity)?;
        let parent = declared.parent?;
        let local = declared.position.as_ref()?.value_at(time)?;
        if parent == frame {
            return Some(local);
        }
        Some(self.frame_to_frame(parent, frame, time)?.apply(local))
    }

    fn orientation(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Quaternion> {
        let declared = self.entities.get(&entity)?;
        let parent = declared.parent?;
        let local = declared.orientation.as_ref()?.value_at(time)?;
        if parent == frame {
            return Some(local);
        }
        Some(self.frame_to_frame(parent, frame, time)?.rotation * local)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use chrono::Utc;

    use super::*;
    use crate::frame::FixedFrame;
    use crate::graph::{ancestor_reference_frames, root_reference_frame};

    fn placed(name: &str, parent: impl Into<ReferenceFrame>, at: Cartesian3, rot: Quaternion) -> SceneEntity {
        SceneEntity::new(name)
            .with_parent(parent)
            .with_position(Property::Constant(at))
            .with_orientation(Property::Constant(rot))
    }

    /// stage (fixed) -> rig (rotated 90° about z) -> camera
    fn rig_scene() -> (Scene, EntityId, EntityId, EntityId) {
        let mut scene = Scene::new("rig");
        let stage = scene
            .add_entity(placed(
                "stage",
                FixedFrame::Fixed,
                Cartesian3::new(10.0, 0.0, 0.0),
                Quaternion::IDENTITY,
            ))
            .unwrap();
        let rig = scene
            .add_entity(placed(
                "rig",
                stage,
                Cartesian3::new(0.0, 5.0, 0.0),
                Quaternion::from_rotation_z(FRAC_PI_2),
            ))
            .unwrap();
        let camera = scene
            .add_entity(placed(
                "camera",
                rig,
                Cartesian3::new(1.0, 0.0, 0.0),
                Quaternion::IDENTITY,
            ))
            .unwrap();
        (scene, stage, rig, camera)
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut scene = Scene::new("test");
        scene.add_entity(SceneEntity::new("Camera")).unwrap();
        let result = scene.add_entity(SceneEntity::new("camera"));
        assert!(matches!(result, Err(FrameError::DuplicateName(_))));
    }

    #[test]
    fn unknown_parent_rejected() {
        let mut scene = Scene::new("test");
        let ghost = EntityId::new();
        let result = scene.add_entity(SceneEntity::new("orphan").with_parent(ghost));
        assert!(matches!(result, Err(FrameError::EntityNotFound(id)) if id == ghost));
    }

    #[test]
    fn find_by_name_case_insensitive() {
        let (scene, _, rig, _) = rig_scene();
        assert_eq!(scene.find_id_by_name("RIG"), Some(rig));
        assert!(scene.find_by_name("nobody").is_none());
        assert_eq!(scene.entity_name(rig), "rig");
        assert_eq!(scene.entity_name(EntityId::new()), "unknown");
    }

    #[test]
    fn position_in_own_frame_is_local() {
        let (scene, _, rig, camera) = rig_scene();
        let pos = scene.position(camera, Utc::now(), rig.into()).unwrap();
        assert_eq!(pos, Cartesian3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn position_composes_to_fixed_root() {
        let (scene, _, _, camera) = rig_scene();
        let pos = scene
            .position(camera, Utc::now(), FixedFrame::Fixed.into())
            .unwrap();
        // rig rotates camera's +x onto +y
        assert!(pos.abs_diff_eq(Cartesian3::new(10.0, 6.0, 0.0), 1e-9));
    }

    #[test]
    fn position_in_sibling_branch() {
        let (mut scene, stage, _, camera) = rig_scene();
        let marker = scene
            .add_entity(placed(
                "marker",
                stage,
                Cartesian3::new(0.0, 6.0, 0.0),
                Quaternion::IDENTITY,
            ))
            .unwrap();
        let pos = scene.position(camera, Utc::now(), marker.into()).unwrap();
        assert!(pos.abs_diff_eq(Cartesian3::ZERO, 1e-9));
    }

    #[test]
    fn position_relative_to_itself_is_origin() {
        let (scene, _, _, camera) = rig_scene();
        let pos = scene.position(camera, Utc::now(), camera.into()).unwrap();
        assert!(pos.abs_diff_eq(Cartesian3::ZERO, 1e-9));
        let rot = scene.orientation(camera, Utc::now(), camera.into()).unwrap();
        assert!(rot.abs_diff_eq(Quaternion::IDENTITY, 1e-9));
    }

    #[test]
    fn orientation_composes() {
        let (scene, _, _, camera) = rig_scene();
        let rot = scene
            .orientation(camera, Utc::now(), FixedFrame::Fixed.into())
            .unwrap();
        assert!(rot.abs_diff_eq(Quaternion::from_rotation_z(FRAC_PI_2), 1e-9));
    }

    #[test]
    fn different_fixed_roots_are_unreachable() {
        let (scene, _, _, camera) = rig_scene();
        assert!(
            scene
                .position(camera, Utc::now(), FixedFrame::Inertial.into())
                .is_none()
        );
    }

    #[test]
    fn missing_intermediate_orientation_is_unreachable() {
        let mut scene = Scene::new("test");
        let anchor = scene
            .add_entity(
                SceneEntity::new("anchor")
                    .with_parent(FixedFrame::Fixed)
                    .with_position(Property::Constant(Cartesian3::ZERO)),
            )
            .unwrap();
        let child = scene
            .add_entity(placed("child", anchor, Cartesian3::X, Quaternion::IDENTITY))
            .unwrap();
        assert!(scene.position(child, Utc::now(), anchor.into()).is_some());
        assert!(
            scene
                .position(child, Utc::now(), FixedFrame::Fixed.into())
                .is_none()
        );
    }

    #[test]
    fn set_parent_can_create_cycle_that_walker_reports() {
        let (mut scene, stage, _, camera) = rig_scene();
        scene.set_parent(stage, Some(camera.into())).unwrap();
        let err = ancestor_reference_frames(&scene, camera).unwrap_err();
        assert!(err.is_structural());
        assert!(scene.position(camera, Utc::now(), FixedFrame::Fixed.into()).is_none());
    }

    #[test]
    fn set_parent_updates_child_index() {
        let (mut scene, stage, rig, camera) = rig_scene();
        assert_eq!(scene.children_of(rig).len(), 1);
        scene.set_parent(camera, Some(stage.into())).unwrap();
        assert!(scene.children_of(rig).is_empty());
        assert_eq!(scene.children_of(stage).len(), 2);
    }

    #[test]
    fn remove_entity_orphans_children() {
        let (mut scene, _, rig, camera) = rig_scene();
        scene.remove_entity(rig).unwrap();
        assert_eq!(scene.entity_count(), 2);
        assert!(scene.parent_frame(camera).is_none());
        assert_eq!(
            root_reference_frame(&scene, camera).unwrap(),
            ReferenceFrame::Entity(camera)
        );
        assert!(matches!(
            scene.remove_entity(rig),
            Err(FrameError::EntityNotFound(_))
        ));
    }
}
