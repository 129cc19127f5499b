use serde::Serialize;

use crate::entity::{Cartesian3, EntityId, JulianDate, Quaternion};
use crate::error::{FrameError, FrameResult};
use crate::frame::ReferenceFrame;
use crate::graph::FrameGraph;
use crate::source::TransformSource;

/// Snapshot of an entity's position and orientation in a frame at a time.
///
/// Position or orientation is `None` when the transform system could not
/// resolve it; the frame and time are always known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPose {
    position: Option<Cartesian3>,
    orientation: Option<Quaternion>,
    reference_frame: ReferenceFrame,
    time: JulianDate,
}

impl EntityPose {
    /// Create a pose snapshot.
    pub fn new(
        position: Option<Cartesian3>,
        orientation: Option<Quaternion>,
        reference_frame: ReferenceFrame,
        time: JulianDate,
    ) -> Self {
        Self {
            position,
            orientation,
            reference_frame,
            time,
        }
    }

    /// Position in the reference frame, if resolved.
    pub fn position(&self) -> Option<Cartesian3> {
        self.position
    }

    /// Orientation in the reference frame, if resolved.
    pub fn orientation(&self) -> Option<Quaternion> {
        self.orientation
    }

    /// The frame the pose is expressed in.
    pub fn reference_frame(&self) -> ReferenceFrame {
        self.reference_frame
    }

    /// The time the pose was evaluated at.
    pub fn time(&self) -> JulianDate {
        self.time
    }

    /// True when both position and orientation are known.
    pub fn is_complete(&self) -> bool {
        self.position.is_some() && self.orientation.is_some()
    }
}

impl<S: TransformSource + ?Sized> FrameGraph<'_, S> {
    /// Pose of `entity` at `time` in the frame it declares its position in.
    ///
    /// Unresolvable values become `None` fields instead of failing the call.
    pub fn calculate_pose(&self, entity: EntityId, time: JulianDate) -> FrameResult<EntityPose> {
        let frame = self
            .source()
            .parent_frame(entity)
            .ok_or(FrameError::NoReferenceFrame(entity))?;

        let position = self
            .entity_position_in_reference_frame(entity, time, frame)
            .ok();
        let orientation = self
            .entity_orientation_in_reference_frame(entity, time, frame)
            .ok();

        tracing::trace!(
            %entity,
            %frame,
            has_position = position.is_some(),
            has_orientation = orientation.is_some(),
            "calculated pose"
        );
        Ok(EntityPose::new(position, orientation, frame, time))
    }
}

/// Pose of `entity` at `time` in its own reference frame.
pub fn calculate_pose<S: TransformSource + ?Sized>(
    source: &S,
    entity: EntityId,
    time: JulianDate,
) -> FrameResult<EntityPose> {
    FrameGraph::new(source).calculate_pose(entity, time)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::frame::FixedFrame;
    use crate::property::{Property, Sample};
    use crate::scene::{Scene, SceneEntity};

    fn t0() -> JulianDate {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn pose_uses_declared_frame() {
        let mut scene = Scene::new("test");
        let stage = scene
            .add_entity(
                SceneEntity::new("stage")
                    .with_parent(FixedFrame::Fixed)
                    .with_position(Property::Constant(Cartesian3::new(100.0, 0.0, 0.0))),
            )
            .unwrap();
        let device = scene
            .add_entity(
                SceneEntity::new("device")
                    .with_parent(stage)
                    .with_position(Property::Constant(Cartesian3::new(0.0, 1.6, 0.0)))
                    .with_orientation(Property::Constant(Quaternion::IDENTITY)),
            )
            .unwrap();

        let pose = calculate_pose(&scene, device, t0()).unwrap();
        assert_eq!(pose.reference_frame(), ReferenceFrame::Entity(stage));
        assert_eq!(pose.position(), Some(Cartesian3::new(0.0, 1.6, 0.0)));
        assert_eq!(pose.orientation(), Some(Quaternion::IDENTITY));
        assert_eq!(pose.time(), t0());
        assert!(pose.is_complete());
    }

    #[test]
    fn unresolved_fields_are_none() {
        let mut scene = Scene::new("test");
        let tracker = scene
            .add_entity(
                SceneEntity::new("tracker")
                    .with_parent(FixedFrame::Fixed)
                    .with_position(Property::sampled(vec![
                        Sample::new(t0(), Cartesian3::ZERO),
                        Sample::new(t0() + Duration::seconds(1), Cartesian3::X),
                    ])),
            )
            .unwrap();

        let later = t0() + Duration::seconds(30);
        let pose = calculate_pose(&scene, tracker, later).unwrap();
        assert_eq!(pose.reference_frame(), ReferenceFrame::Fixed(FixedFrame::Fixed));
        assert_eq!(pose.time(), later);
        assert!(pose.position().is_none());
        assert!(pose.orientation().is_none());
        assert!(!pose.is_complete());
    }

    #[test]
    fn entity_without_frame_is_an_error() {
        let mut scene = Scene::new("test");
        let loose = scene.add_entity(SceneEntity::new("loose")).unwrap();
        assert!(matches!(
            calculate_pose(&scene, loose, t0()),
            Err(FrameError::NoReferenceFrame(id)) if id == loose
        ));
    }
}
