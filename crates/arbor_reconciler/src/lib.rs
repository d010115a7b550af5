//! # Arbor Reconciler
//!
//! Host adapter between an external tree-diffing engine and an Arbor
//! [`SceneGraph`](arbor_scene::SceneGraph).
//!
//! - [`HostConfig`]: the create/append/insert/remove/update effect protocol
//! - [`SceneReconciler`]: its implementation over a scene graph
//! - [`apply_props`]: partial prop updates with settable copy semantics
//! - [`Registry`]: type tags to object constructors
//!
//! # Example
//!
//! ```rust
//! use arbor_reconciler::prelude::*;
//!
//! let mut reconciler = SceneReconciler::default();
//! let scene = reconciler.graph_mut().insert(Object::spatial("scene"));
//!
//! let cube = VirtualNode::new("mesh")
//!     .prop("position-x", 2.0)
//!     .child(VirtualNode::new("boxGeometry").arg(1.0).arg(1.0).arg(1.0))
//!     .child(VirtualNode::new("meshBasicMaterial").prop("color", "hotpink"));
//!
//! let mesh = reconciler.mount(Instance::Node(scene), &cube).unwrap();
//! assert_eq!(reconciler.graph().children(scene), &[mesh.as_node().unwrap()]);
//! ```

pub mod apply;
pub mod error;
pub mod host;
pub mod instance;
pub mod props;
pub mod reconciler;
pub mod registry;
pub mod vnode;

pub use apply::apply_props;
pub use error::{PropError, ReconcileError, Result};
pub use host::{HostConfig, HostContext, TextInstance, UpdatePayload};
pub use instance::{DataLeaf, Instance, LeafId};
pub use props::Props;
pub use reconciler::SceneReconciler;
pub use registry::{Registry, PRIMITIVE};
pub use vnode::VirtualNode;

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::apply::apply_props;
    pub use crate::error::{PropError, ReconcileError, Result};
    pub use crate::host::HostConfig;
    pub use crate::instance::{Instance, LeafId};
    pub use crate::props::Props;
    pub use crate::reconciler::SceneReconciler;
    pub use crate::registry::Registry;
    pub use crate::vnode::VirtualNode;

    pub use arbor_scene::{HandlerKind, Object, ObjectId, SceneGraph, Value};
}
