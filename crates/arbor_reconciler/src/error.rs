//! Error types for arbor_reconciler

use crate::instance::LeafId;
use arbor_scene::SceneError;
use thiserror::Error;

/// Errors raised while applying props
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropError {
    /// A dotted prop path names a segment that does not resolve
    #[error("invalid prop path `{path}`: segment `{segment}` does not resolve")]
    InvalidPath { path: String, segment: String },

    /// Scene graph or settable error
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors raised by host effects
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    /// No constructor is registered for the type tag
    #[error("unknown type `{0}`")]
    UnknownType(String),

    /// The tag is reserved and cannot be registered
    #[error("type `{0}` is reserved")]
    ReservedTag(String),

    /// A `primitive` node without a live `object` prop
    #[error("primitive requires an `object` prop naming a live object")]
    MissingPrimitive,

    /// A constructor rejected its arguments
    #[error("cannot construct `{type_tag}`: {reason}")]
    Construct { type_tag: String, reason: String },

    /// The leaf handle is stale
    #[error("unknown data leaf {0:?}")]
    UnknownLeaf(LeafId),

    /// The graph model cannot represent the operation
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Prop application failed
    #[error(transparent)]
    Prop(#[from] PropError),

    /// Scene graph error
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Result type for arbor_reconciler operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
