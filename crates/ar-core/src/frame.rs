use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// A fixed, enumerated reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedFrame {
    /// Earth-centered, earth-fixed.
    Fixed,
    /// Earth-centered inertial.
    Inertial,
}

impl FixedFrame {
    /// Parse a fixed frame from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(Self::Fixed),
            "inertial" => Some(Self::Inertial),
            _ => None,
        }
    }
}

impl fmt::Display for FixedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Inertial => write!(f, "inertial"),
        }
    }
}

/// The coordinate system a position or orientation is expressed in.
///
/// Either one of the fixed frames, or another entity acting as a dynamic frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFrame {
    /// A fixed frame constant. Always a root.
    Fixed(FixedFrame),
    /// An entity whose own pose defines the frame.
    Entity(EntityId),
}

impl ReferenceFrame {
    /// Returns the entity if this is a dynamic frame.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(id) => Some(*id),
            Self::Fixed(_) => None,
        }
    }

    /// Returns true for fixed frame constants.
    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl From<FixedFrame> for ReferenceFrame {
    fn from(frame: FixedFrame) -> Self {
        Self::Fixed(frame)
    }
}

impl From<EntityId> for ReferenceFrame {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

impl fmt::Display for ReferenceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(frame) => write!(f, "{frame}"),
            Self::Entity(id) => write!(f, "entity:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_frames() {
        assert_eq!(FixedFrame::parse("fixed"), Some(FixedFrame::Fixed));
        assert_eq!(FixedFrame::parse("inertial"), Some(FixedFrame::Inertial));
        assert_eq!(FixedFrame::parse("camera"), None);
    }

    #[test]
    fn entity_accessor() {
        let id = EntityId::new();
        assert_eq!(ReferenceFrame::from(id).entity(), Some(id));
        assert!(ReferenceFrame::from(FixedFrame::Fixed).entity().is_none());
        assert!(ReferenceFrame::Fixed(FixedFrame::Inertial).is_fixed());
    }
}
