use std::collections::HashSet;

use crate::config::GraphConfig;
use crate::entity::{Cartesian3, EntityId, JulianDate, Quaternion};
use crate::error::{FrameError, FrameResult, Quantity};
use crate::frame::ReferenceFrame;
use crate::source::TransformSource;

/// Walks the reference-frame graph of a [`TransformSource`].
#[derive(Debug)]
pub struct FrameGraph<'a, S: ?Sized> {
    source: &'a S,
    config: GraphConfig,
}

impl<'a, S: TransformSource + ?Sized> FrameGraph<'a, S> {
    /// Create a walker with the default configuration.
    pub fn new(source: &'a S) -> Self {
        Self::with_config(source, GraphConfig::default())
    }

    /// Create a walker with an explicit configuration.
    pub fn with_config(source: &'a S, config: GraphConfig) -> Self {
        Self { source, config }
    }

    /// The underlying transform source.
    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Frames above `entity`, root first and immediate parent last.
    ///
    /// The walk stops at a fixed frame or at an entity without a parent.
    /// An entity with no parent has no ancestors.
    pub fn ancestor_reference_frames(&self, entity: EntityId) -> FrameResult<Vec<ReferenceFrame>> {
        let mut frames = Vec::new();
        let mut visited = HashSet::from([entity]);
        let mut current = entity;

        while let Some(parent) = self.source.parent_frame(current) {
            if frames.len() >= self.config.max_depth {
                return Err(FrameError::DepthExceeded {
                    entity,
                    max_depth: self.config.max_depth,
                });
            }
            frames.push(parent);
            match parent {
                ReferenceFrame::Fixed(_) => break,
                ReferenceFrame::Entity(id) => {
                    if !visited.insert(id) {
                        return Err(FrameError::Cycle(id));
                    }
                    current = id;
                }
            }
        }

        frames.reverse();
        tracing::trace!(%entity, depth = frames.len(), "resolved ancestor frames");
        Ok(frames)
    }

    /// The terminal frame of the ancestor chain, or the entity itself if it
    /// has no ancestors.
    pub fn root_reference_frame(&self, entity: EntityId) -> FrameResult<ReferenceFrame> {
        let frames = self.ancestor_reference_frames(entity)?;
        Ok(frames
            .first()
            .copied()
            .unwrap_or(ReferenceFrame::Entity(entity)))
    }

    /// Position of `entity` at `time` expressed in `frame`.
    pub fn entity_position_in_reference_frame(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> FrameResult<Cartesian3> {
        self.source
            .position(entity, time, frame)
            .ok_or(FrameError::Unresolved {
                entity,
                quantity: Quantity::Position,
                frame,
            })
    }

    /// Orientation of `entity` at `time` expressed in `frame`.
    pub fn entity_orientation_in_reference_frame(
        &self,
        entity: EntityId,
        time: JulianDate,
        frame: ReferenceFrame,
    ) -> FrameResult<Quaternion> {
        self.source
            .orientation(entity, time, frame)
            .ok_or(FrameError::Unresolved {
                entity,
                quantity: Quantity::Orientation,
                frame,
            })
    }
}

/// Frames above `entity`, root first. See [`FrameGraph::ancestor_reference_frames`].
pub fn ancestor_reference_frames<S: TransformSource + ?Sized>(
    source: &S,
    entity: EntityId,
) -> FrameResult<Vec<ReferenceFrame>> {
    FrameGraph::new(source).ancestor_reference_frames(entity)
}

/// Root frame of `entity`. See [`FrameGraph::root_reference_frame`].
pub fn root_reference_frame<S: TransformSource + ?Sized>(
    source: &S,
    entity: EntityId,
) -> FrameResult<ReferenceFrame> {
    FrameGraph::new(source).root_reference_frame(entity)
}

/// Position of `entity` at `time` in `frame`.
pub fn entity_position_in_reference_frame<S: TransformSource + ?Sized>(
    source: &S,
    entity: EntityId,
    time: JulianDate,
    frame: ReferenceFrame,
) -> FrameResult<Cartesian3> {
    FrameGraph::new(source).entity_position_in_reference_frame(entity, time, frame)
}

/// Orientation of `entity` at `time` in `frame`.
pub fn entity_orientation_in_reference_frame<S: TransformSource + ?Sized>(
    source: &S,
    entity: EntityId,
    time: JulianDate,
    frame: ReferenceFrame,
) -> FrameResult<Quaternion> {
    FrameGraph::new(source).entity_orientation_in_reference_frame(entity, time, frame)
}
