//! Pointer picking
//!
//! Turns pointer positions into ray casts against the scene and dispatches
//! hover, unhover and click handlers.
//!
//! Only objects carrying a handler table take part. Hover is tracked per
//! object across moves:
//!
//! - an object with a hover handler that enters the hit list fires `Hover`
//!   once and is remembered
//! - it fires nothing more while it stays in the hit list
//! - when it leaves, `Unhover` fires once (if bound) and it is forgotten
//!
//! Clicks ignore hover state and fire once per distinct object, nearest
//! first.

use crate::config::Size;
use arbor_scene::{
    Camera, HandlerEvent, HandlerKind, Intersection, ObjectId, Raycaster, SceneGraph,
    SpatialQuery, Vec2,
};
use rustc_hash::FxHashSet;

/// Cursor requested by the picker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    #[default]
    Default,
    /// Over an interactive object
    Pointer,
}

/// Receives cursor changes
pub trait CursorSink {
    fn set_cursor(&mut self, cursor: Cursor);
}

impl<F: FnMut(Cursor)> CursorSink for F {
    fn set_cursor(&mut self, cursor: Cursor) {
        self(cursor)
    }
}

/// What the pointer is cast against
#[derive(Clone, Copy, Debug)]
pub struct Viewport<'a> {
    /// Root whose descendants are tested
    pub scene: ObjectId,
    pub camera: &'a Camera,
    pub size: Size,
}

/// Convert a device position to normalized device coordinates.
///
/// x grows to the right and y grows upward, both in `[-1, 1]`.
pub fn to_ndc(position: Vec2, size: Size) -> Vec2 {
    if size.is_empty() {
        return Vec2::ZERO;
    }
    Vec2::new(
        (position.x / size.width) * 2.0 - 1.0,
        -(position.y / size.height) * 2.0 + 1.0,
    )
}

/// Hover state and hit testing for one session
pub struct PointerPicker {
    query: Box<dyn SpatialQuery>,
    hovered: FxHashSet<ObjectId>,
    cursor: Cursor,
}

impl Default for PointerPicker {
    fn default() -> Self {
        Self::new(Box::new(Raycaster::default()))
    }
}

impl PointerPicker {
    pub fn new(query: Box<dyn SpatialQuery>) -> Self {
        Self {
            query,
            hovered: FxHashSet::default(),
            cursor: Cursor::Default,
        }
    }

    /// Replace the spatial query
    pub fn set_query(&mut self, query: Box<dyn SpatialQuery>) {
        self.query = query;
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_hovered(&self, id: ObjectId) -> bool {
        self.hovered.contains(&id)
    }

    pub fn hovered_count(&self) -> usize {
        self.hovered.len()
    }

    /// Hits under an NDC position, nearest first, restricted to objects with
    /// handlers
    pub fn intersect(&self, graph: &SceneGraph, viewport: &Viewport<'_>, ndc: Vec2) -> Vec<Intersection> {
        let ray = viewport.camera.ray_from_ndc(ndc);
        self.query
            .intersect(graph, viewport.scene, &ray)
            .into_iter()
            .filter(|hit| graph.get(hit.object).is_some_and(|o| o.handlers().is_some()))
            .collect()
    }

    /// Handle pointer motion.
    ///
    /// Returns the handlers fired, in dispatch order. Unhover events for
    /// objects the pointer left fire before hover events for new entries.
    pub fn pointer_move(
        &mut self,
        graph: &mut SceneGraph,
        viewport: &Viewport<'_>,
        position: Vec2,
    ) -> Vec<(ObjectId, HandlerKind)> {
        let ndc = to_ndc(position, viewport.size);
        let hits = self.intersect(graph, viewport, ndc);
        // Only hover candidates make the pointer interactive
        let hoverable = hits
            .iter()
            .any(|hit| has_handler(graph, hit.object, HandlerKind::Hover));
        self.cursor = if hoverable {
            Cursor::Pointer
        } else {
            Cursor::Default
        };

        // Objects removed since the last move leave silently
        self.hovered.retain(|id| graph.contains(*id));

        let present: FxHashSet<ObjectId> = hits.iter().map(|hit| hit.object).collect();
        let left: Vec<ObjectId> = self
            .hovered
            .iter()
            .filter(|id| !present.contains(*id))
            .copied()
            .collect();

        let mut seen = FxHashSet::default();
        let entered: Vec<Intersection> = hits
            .iter()
            .filter(|hit| seen.insert(hit.object) && !self.hovered.contains(&hit.object))
            .filter(|hit| has_handler(graph, hit.object, HandlerKind::Hover))
            .copied()
            .collect();

        let mut fired = Vec::new();
        for id in left {
            self.hovered.remove(&id);
            tracing::trace!(?id, "unhover");
            if dispatch(graph, HandlerEvent::new(HandlerKind::Unhover, id)) {
                fired.push((id, HandlerKind::Unhover));
            }
        }
        for hit in entered {
            if !graph.contains(hit.object) {
                continue;
            }
            self.hovered.insert(hit.object);
            tracing::trace!(id = ?hit.object, "hover");
            if dispatch(graph, HandlerEvent::from_hit(HandlerKind::Hover, hit, ndc)) {
                fired.push((hit.object, HandlerKind::Hover));
            }
        }
        fired
    }

    /// Handle a click: fire each distinct hit object's click handler once
    pub fn click(
        &mut self,
        graph: &mut SceneGraph,
        viewport: &Viewport<'_>,
        position: Vec2,
    ) -> Vec<(ObjectId, HandlerKind)> {
        let ndc = to_ndc(position, viewport.size);
        let hits = self.intersect(graph, viewport, ndc);

        let mut seen = FxHashSet::default();
        let mut fired = Vec::new();
        for hit in hits {
            if !seen.insert(hit.object) {
                continue;
            }
            if dispatch(graph, HandlerEvent::from_hit(HandlerKind::Click, hit, ndc)) {
                fired.push((hit.object, HandlerKind::Click));
            }
        }
        fired
    }

    /// Pointer left the viewport: unhover everything
    pub fn pointer_leave(&mut self, graph: &mut SceneGraph) -> Vec<(ObjectId, HandlerKind)> {
        let left: Vec<ObjectId> = self.hovered.drain().collect();
        self.cursor = Cursor::Default;

        let mut fired = Vec::new();
        for id in left {
            if dispatch(graph, HandlerEvent::new(HandlerKind::Unhover, id)) {
                fired.push((id, HandlerKind::Unhover));
            }
        }
        fired
    }

    /// Forget all hover state without firing anything
    pub fn reset(&mut self) {
        self.hovered.clear();
        self.cursor = Cursor::Default;
    }
}

fn has_handler(graph: &SceneGraph, id: ObjectId, kind: HandlerKind) -> bool {
    graph
        .get(id)
        .and_then(|object| object.handlers())
        .is_some_and(|table| table.contains(kind))
}

/// Call the target's handler for `event.kind`, if it is still bound.
///
/// Returns whether a handler ran.
fn dispatch(graph: &mut SceneGraph, event: HandlerEvent) -> bool {
    let callback = graph
        .get(event.target)
        .and_then(|object| object.handlers())
        .and_then(|table| table.get(event.kind))
        .cloned();
    match callback {
        Some(callback) => {
            callback(graph, &event);
            true
        }
        None => false,
    }
}
