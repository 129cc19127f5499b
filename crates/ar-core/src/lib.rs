//! Core types for augmented-reality entities: reference frames, poses, and events.
//!
//! The entity/time/transform system is abstracted behind [`TransformSource`].
//! The frame-graph walker and the pose calculator only orchestrate calls into
//! it. [`Scene`] is an in-memory source that composes rigid transforms along a
//! parent chain; you can build one programmatically or load it from JSON.

/// Builder-style configuration for the frame-graph walker.
pub mod config;
/// Scene file format and conversion into a [`Scene`].
pub mod document;
/// Entity identifiers, time, and math aliases.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Generic multi-listener event primitive.
pub mod event;
/// Fixed and dynamic reference frames.
pub mod frame;
/// Ancestor walking and frame-relative position/orientation lookups.
pub mod graph;
/// Pose snapshots of an entity at a given time.
pub mod pose;
/// Constant and sampled time-varying properties.
pub mod property;
/// In-memory transform source.
pub mod scene;
/// The trait the external transform system implements.
pub mod source;

/// Re-export graph configuration.
pub use config::GraphConfig;
/// Re-export entity types and aliases.
pub use entity::{Cartesian3, EntityId, JulianDate, Quaternion};
/// Re-export error types.
pub use error::{FrameError, FrameResult, Quantity};
/// Re-export event types.
pub use event::{Event, ListenerId, RemoveCallback};
/// Re-export frame types.
pub use frame::{FixedFrame, ReferenceFrame};
/// Re-export the walker.
pub use graph::{
    FrameGraph, ancestor_reference_frames, entity_orientation_in_reference_frame,
    entity_position_in_reference_frame, root_reference_frame,
};
/// Re-export pose types.
pub use pose::{EntityPose, calculate_pose};
/// Re-export property types.
pub use property::{Property, Sample};
/// Re-export the in-memory scene.
pub use scene::{Scene, SceneEntity};
/// Re-export the transform source trait.
pub use source::TransformSource;
