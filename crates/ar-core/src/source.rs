use crate::entity::{Cartesian3, EntityId, JulianDate, Quaternion};
use crate::frame::ReferenceFrame;

/// The entity/time/transform system the walker and pose calculator delegate to.
///
/// Implementations return `None` when a value is undefined at the requested
/// time, or when `frame` is not reachable from the entity's frame graph.
pub trait TransformSource {
    /// The frame the entity's position and orientation are declared in.
    fn parent_frame(&self, entity: EntityId) -> Option<ReferenceFrame>;

    /// Position of `entity` at `time`, expressed in `frame`.
    fn position(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Cartesian3>;

    /// Orientation of `entity` at `time`, expressed in `frame`.
    fn orientation(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Quaternion>;
}

impl<S: TransformSource + ?Sized> TransformSource for &S {
    fn parent_frame(&self, entity: EntityId) -> Option<ReferenceFrame> {
        (**self).parent_frame(entity)
    }

    fn position(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Cartesian3> {
        (**self).position(entity, time, frame)
    }

    fn orientation(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> Option<Quaternion> {
        (**self).orientation(entity, time, frame)
    }
}
