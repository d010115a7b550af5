//! Scene graph error types

use crate::object::ObjectId;
use thiserror::Error;

/// Errors raised by scene graph and settable operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The id does not name a live object
    #[error("unknown object {0:?}")]
    UnknownObject(ObjectId),

    /// A structural operation targeted an object without a child list
    #[error("object {0:?} is not spatial")]
    NotSpatial(ObjectId),

    /// The child is not in the parent's child list
    #[error("object {child:?} is not a child of {parent:?}")]
    NotAChild { parent: ObjectId, child: ObjectId },

    /// Adding the child would make an object its own ancestor
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    WouldCycle { parent: ObjectId, child: ObjectId },

    /// A settable setter received arguments it cannot interpret
    #[error("{kind}: invalid arguments: {reason}")]
    InvalidArguments { kind: &'static str, reason: String },

    /// A settable has no component with this name
    #[error("{kind} has no component `{component}`")]
    UnknownComponent {
        kind: &'static str,
        component: String,
    },
}

/// Result type for scene graph operations
pub type Result<T> = std::result::Result<T, SceneError>;
