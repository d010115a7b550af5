//! Host instances
//!
//! Elements reconcile into one of two kinds of instance:
//!
//! - [`Instance::Node`]: a spatial object, linked into its parent's child list
//! - [`Instance::Leaf`]: a placeholder wrapping a non-spatial data object
//!   (geometry, material, ...), attached to its parent as a named field
//!
//! A leaf keeps the same [`LeafId`] for its whole lifetime, even when the
//! object inside it is replaced because its constructor args changed.

use arbor_scene::ObjectId;
use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a data leaf
    pub struct LeafId;
}

/// Handle to a reconciled instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instance {
    Node(ObjectId),
    Leaf(LeafId),
}

impl Instance {
    pub fn as_node(self) -> Option<ObjectId> {
        match self {
            Instance::Node(id) => Some(id),
            Instance::Leaf(_) => None,
        }
    }

    pub fn as_leaf(self) -> Option<LeafId> {
        match self {
            Instance::Leaf(id) => Some(id),
            Instance::Node(_) => None,
        }
    }
}

impl From<ObjectId> for Instance {
    fn from(id: ObjectId) -> Self {
        Instance::Node(id)
    }
}

impl From<LeafId> for Instance {
    fn from(id: LeafId) -> Self {
        Instance::Leaf(id)
    }
}

/// Placeholder for a non-spatial object
#[derive(Clone, Debug)]
pub struct DataLeaf {
    /// Current underlying object
    pub object: ObjectId,
    /// Object the leaf is attached to, if any
    pub parent: Option<ObjectId>,
    /// Field name used when attaching
    pub attach: String,
}

impl DataLeaf {
    pub fn new(object: ObjectId, attach: impl Into<String>) -> Self {
        Self {
            object,
            parent: None,
            attach: attach.into(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }
}
