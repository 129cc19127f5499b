use std::fmt;

use crate::entity::EntityId;
use crate::frame::ReferenceFrame;

/// Alias for `Result<T, FrameError>`.
pub type FrameResult<T> = Result<T, FrameError>;

/// Which value of an entity could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// The entity's position.
    Position,
    /// The entity's orientation.
    Orientation,
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Orientation => write!(f, "orientation"),
        }
    }
}

/// Errors that can occur when resolving frames and poses.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The ancestor chain revisits an entity.
    #[error("reference frame cycle detected at entity {0}")]
    Cycle(EntityId),

    /// The ancestor chain is longer than the configured maximum depth.
    #[error("ancestor chain of entity {entity} exceeds maximum depth {max_depth}")]
    DepthExceeded {
        /// The entity whose chain was being walked.
        entity: EntityId,
        /// The configured limit.
        max_depth: usize,
    },

    /// The transform system has no value for the entity at the requested time and frame.
    #[error("{quantity} of entity {entity} is undefined in frame {frame}")]
    Unresolved {
        /// The entity being evaluated.
        entity: EntityId,
        /// Position or orientation.
        quantity: Quantity,
        /// The requested target frame.
        frame: ReferenceFrame,
    },

    /// The entity declares no parent frame, so no pose can be expressed.
    #[error("entity {0} has no reference frame")]
    NoReferenceFrame(EntityId),

    /// The requested entity ID does not exist in the scene.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// An entity with the same name already exists.
    #[error("entity already exists: \"{0}\"")]
    DuplicateName(String),

    /// A named parent reference could not be resolved.
    #[error("invalid reference: frame \"{0}\" is neither a fixed frame nor a known entity")]
    InvalidReference(String),

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scene document could not be parsed.
    #[error("invalid scene document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FrameError {
    /// Returns true for errors caused by a malformed frame graph.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Cycle(_) | Self::DepthExceeded { .. })
    }
}
