//! # Arbor Runtime
//!
//! Render sessions for Arbor scene graphs.
//!
//! A [`Root`] ties a [`SceneReconciler`](arbor_reconciler::SceneReconciler)
//! to a frame loop and a pointer picker:
//!
//! - [`Root::tick`] runs subscribers and draws each frame
//! - [`Root::handle_pointer`] dispatches hover, unhover and click handlers
//! - [`Root::defer`] queues low-priority work after the draw step
//!
//! # Example
//!
//! ```rust
//! use arbor_runtime::prelude::*;
//!
//! let mut root = Root::builder(RootConfig::default().with_size(400.0, 400.0)).build();
//! root.render(
//!     &VirtualNode::new("mesh")
//!         .on(HandlerKind::Click, |graph, event| {
//!             if let Some(mesh) = graph.get_mut(event.target) {
//!                 mesh.set_field("name", "clicked".into());
//!             }
//!         })
//!         .child(VirtualNode::new("boxGeometry")),
//! )
//! .unwrap();
//!
//! root.activate().unwrap();
//! root.tick();
//! let fired = root.handle_pointer(PointerEvent::click(200.0, 200.0));
//! assert_eq!(fired.len(), 1);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod frameloop;
pub mod picking;
pub mod render;
pub mod root;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CameraConfig, RootConfig, Size};
pub use error::{Result, RuntimeError};
pub use frameloop::{
    FrameCallback, FrameLoop, FrameState, FrameTiming, LoopState, ManualTicks, SubscriptionId,
    TickScheduler,
};
pub use picking::{to_ndc, Cursor, CursorSink, PointerPicker, Viewport};
pub use render::{NullRenderer, SceneRenderer};
pub use root::{PointerEvent, PointerKind, Root, RootBuilder, RootId, RootRegistry};
pub use tasks::{TaskId, TaskQueue};

/// Prelude module - import everything commonly needed
pub mod prelude {
    pub use crate::config::{RootConfig, Size};
    pub use crate::error::{Result, RuntimeError};
    pub use crate::frameloop::{FrameState, TickScheduler};
    pub use crate::picking::Cursor;
    pub use crate::render::SceneRenderer;
    pub use crate::root::{PointerEvent, Root, RootRegistry};

    pub use arbor_reconciler::prelude::*;
}
