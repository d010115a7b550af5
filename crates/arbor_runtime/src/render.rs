//! Renderer interface

use arbor_scene::{Camera, ObjectId, SceneGraph};

/// Draws a scene graph
///
/// Called once per tick unless the session installs a draw override.
pub trait SceneRenderer {
    fn render(&mut self, graph: &SceneGraph, scene: ObjectId, camera: &Camera);

    /// Viewport changed, in device pixels
    fn resize(&mut self, _width: f32, _height: f32, _pixel_ratio: f32) {}
}

/// Renderer that draws nothing, for headless sessions
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl SceneRenderer for NullRenderer {
    fn render(&mut self, graph: &SceneGraph, scene: ObjectId, _camera: &Camera) {
        tracing::trace!(?scene, objects = graph.len(), "headless frame");
    }
}
