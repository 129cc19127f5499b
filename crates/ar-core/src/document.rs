//! JSON scene documents.
//!
//! ```json
//! {
//!   "name": "lab",
//!   "entities": [
//!     { "name": "stage", "parent": "fixed", "position": { "constant": [0, 0, 0] } },
//!     { "name": "camera", "parent": "stage",
//!       "position": { "sampled": [
//!         { "time": "2024-01-01T00:00:00Z", "value": [0, 1.6, 0] },
//!         { "time": "2024-01-01T00:00:10Z", "value": [1, 1.6, 0] } ] },
//!       "orientation": { "constant": [0, 0, 0, 1] } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::entity::{Cartesian3, EntityId, JulianDate, Quaternion};
use crate::error::{FrameError, FrameResult};
use crate::frame::{FixedFrame, ReferenceFrame};
use crate::property::{Interpolate, Property, Sample};
use crate::scene::{Scene, SceneEntity};

/// Top-level scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene name.
    pub name: String,
    /// Entities in declaration order.
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
}

/// One entity in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Entity name, unique within the file.
    pub name: String,
    /// `"fixed"`, `"inertial"`, or the name of another entity.
    #[serde(default)]
    pub parent: Option<String>,
    /// Position relative to `parent`.
    #[serde(default)]
    pub position: Option<PropertyDocument<Cartesian3>>,
    /// Quaternions are `[x, y, z, w]` and normalized on load.
    #[serde(default)]
    pub orientation: Option<PropertyDocument<Quaternion>>,
}

/// A property as written in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyDocument<T> {
    /// One value for all times.
    Constant(T),
    /// Timestamped samples, in any order.
    Sampled(Vec<SampleDocument<T>>),
}

/// One timestamped value in a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleDocument<T> {
    /// RFC 3339 timestamp.
    pub time: JulianDate,
    /// Value at `time`.
    pub value: T,
}

impl SceneDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> FrameResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a [`Scene`]. Parents may refer to entities declared later in the file.
    pub fn into_scene(self) -> FrameResult<Scene> {
        let mut scene = Scene::new(self.name);
        let mut links: Vec<(EntityId, String)> = Vec::new();

        for doc in self.entities {
            let mut entity = SceneEntity::new(&doc.name);
            entity.position = doc.position.map(|p| p.into_property(Ok)).transpose()?;
            entity.orientation = doc
                .orientation
                .map(|p| p.into_property(|q| normalized(&doc.name, q)))
                .transpose()?;
            let id = scene.add_entity(entity)?;
            if let Some(parent) = doc.parent {
                links.push((id, parent));
            }
        }

        for (id, parent) in links {
            let frame = resolve_frame(&scene, &parent)?;
            scene.set_parent(id, Some(frame))?;
        }
        Ok(scene)
    }
}

impl<T: Interpolate> PropertyDocument<T> {
    fn into_property(self, check: impl Fn(T) -> FrameResult<T>) -> FrameResult<Property<T>> {
        match self {
            Self::Constant(value) => Ok(Property::Constant(check(value)?)),
            Self::Sampled(samples) => {
                let samples = samples
                    .into_iter()
                    .map(|s| Ok(Sample::new(s.time, check(s.value)?)))
                    .collect::<FrameResult<Vec<_>>>()?;
                Ok(Property::sampled(samples))
            }
        }
    }
}

fn normalized(name: &str, q: Quaternion) -> FrameResult<Quaternion> {
    if q.length_squared() <= f64::EPSILON || !q.is_finite() {
        return Err(FrameError::Validation(format!(
            "orientation of \"{name}\" is not a rotation"
        )));
    }
    Ok(q.normalize())
}

fn resolve_frame(scene: &Scene, name: &str) -> FrameResult<ReferenceFrame> {
    if let Some(fixed) = FixedFrame::parse(&name.to_lowercase()) {
        return Ok(fixed.into());
    }
    scene
        .find_id_by_name(name)
        .map(ReferenceFrame::Entity)
        .ok_or_else(|| FrameError::InvalidReference(name.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::graph::ancestor_reference_frames;
    use crate::source::TransformSource;

    const LAB: &str = r#"{
        "name": "lab",
        "entities": [
            { "name": "camera", "parent": "rig",
              "position": { "sampled": [
                  { "time": "2024-01-01T00:00:10Z", "value": [2.0, 0.0, 0.0] },
                  { "time": "2024-01-01T00:00:00Z", "value": [0.0, 0.0, 0.0] } ] },
              "orientation": { "constant": [0.0, 0.0, 0.0, 2.0] } },
            { "name": "rig", "parent": "fixed",
              "position": { "constant": [1.0, 1.0, 1.0] },
              "orientation": { "constant": [0.0, 0.0, 0.0, 1.0] } }
        ]
    }"#;

    #[test]
    fn loads_forward_references() {
        let scene = SceneDocument::from_json(LAB).unwrap().into_scene().unwrap();
        assert_eq!(scene.name, "lab");
        assert_eq!(scene.entity_count(), 2);

        let camera = scene.find_id_by_name("camera").unwrap();
        let rig = scene.find_id_by_name("rig").unwrap();
        assert_eq!(scene.parent_frame(camera), Some(ReferenceFrame::Entity(rig)));
        assert_eq!(
            ancestor_reference_frames(&scene, camera).unwrap(),
            vec![FixedFrame::Fixed.into(), ReferenceFrame::Entity(rig)]
        );
    }

    #[test]
    fn samples_are_sorted_and_orientation_normalized() {
        let scene = SceneDocument::from_json(LAB).unwrap().into_scene().unwrap();
        let camera = scene.find_id_by_name("camera").unwrap();
        let rig = scene.find_id_by_name("rig").unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 5).unwrap();

        let pos = scene.position(camera, t, rig.into()).unwrap();
        assert!((pos.x - 1.0).abs() < 1e-9);
        let rot = scene.orientation(camera, t, rig.into()).unwrap();
        assert!(rot.is_normalized());
    }

    #[test]
    fn unknown_parent_is_invalid_reference() {
        let doc = r#"{ "name": "x", "entities": [ { "name": "a", "parent": "nowhere" } ] }"#;
        let err = SceneDocument::from_json(doc).unwrap().into_scene().unwrap_err();
        assert!(matches!(err, FrameError::InvalidReference(name) if name == "nowhere"));
    }

    #[test]
    fn zero_quaternion_rejected() {
        let doc = r#"{ "name": "x", "entities": [
            { "name": "a", "parent": "fixed", "orientation": { "constant": [0, 0, 0, 0] } } ] }"#;
        let err = SceneDocument::from_json(doc).unwrap().into_scene().unwrap_err();
        assert!(matches!(err, FrameError::Validation(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            SceneDocument::from_json("{ not json"),
            Err(FrameError::Parse(_))
        ));
    }

    #[test]
    fn inertial_parent_is_case_insensitive() {
        let doc = r#"{ "name": "x", "entities": [ { "name": "sat", "parent": "Inertial" } ] }"#;
        let scene = SceneDocument::from_json(doc).unwrap().into_scene().unwrap();
        let sat = scene.find_id_by_name("sat").unwrap();
        assert_eq!(
            scene.parent_frame(sat),
            Some(ReferenceFrame::Fixed(FixedFrame::Inertial))
        );
    }
}
