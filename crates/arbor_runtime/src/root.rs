//! Render sessions
//!
//! A [`Root`] owns everything one rendering surface needs: the scene graph
//! (through its [`SceneReconciler`]), the camera, the frame loop, the idle
//! task queue and the pointer picker. Sessions live in a [`RootRegistry`]
//! and are created and destroyed explicitly.

use crate::clock::{Clock, SystemClock};
use crate::config::{RootConfig, Size};
use crate::error::{Result, RuntimeError};
use crate::frameloop::{FrameLoop, FrameState, LoopState, ManualTicks, SubscriptionId, TickScheduler};
use crate::picking::{Cursor, CursorSink, PointerPicker, Viewport};
use crate::render::{NullRenderer, SceneRenderer};
use crate::tasks::{TaskId, TaskQueue};
use arbor_reconciler::{Instance, Registry, SceneReconciler, VirtualNode};
use arbor_scene::{Camera, HandlerKind, Object, ObjectId, SceneGraph, SpatialQuery, Vec2};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a session in a [`RootRegistry`]
    pub struct RootId;
}

/// Kind of pointer event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Click,
    /// Pointer left the surface
    Leave,
}

/// Pointer event in device pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
        }
    }

    pub fn click(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Click,
            x,
            y,
        }
    }

    pub fn leave() -> Self {
        Self {
            kind: PointerKind::Leave,
            x: 0.0,
            y: 0.0,
        }
    }
}

type CreatedCallback = Box<dyn FnOnce(&mut Root)>;

/// Builder for [`Root`]
pub struct RootBuilder {
    config: RootConfig,
    scheduler: Box<dyn TickScheduler>,
    clock: Box<dyn Clock>,
    renderer: Box<dyn SceneRenderer>,
    picker: PointerPicker,
    registry: Registry,
    cursor_sink: Option<Box<dyn CursorSink>>,
    on_created: Option<CreatedCallback>,
}

impl RootBuilder {
    pub fn new(config: RootConfig) -> Self {
        Self {
            config,
            scheduler: Box::new(ManualTicks),
            clock: Box::new(SystemClock::new()),
            renderer: Box::new(NullRenderer),
            picker: PointerPicker::default(),
            registry: Registry::with_defaults(),
            cursor_sink: None,
            on_created: None,
        }
    }

    pub fn scheduler(mut self, scheduler: impl TickScheduler + 'static) -> Self {
        self.scheduler = Box::new(scheduler);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn renderer(mut self, renderer: impl SceneRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Spatial query used for picking
    pub fn query(mut self, query: impl SpatialQuery + 'static) -> Self {
        self.picker.set_query(Box::new(query));
        self
    }

    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn cursor_sink(mut self, sink: impl CursorSink + 'static) -> Self {
        self.cursor_sink = Some(Box::new(sink));
        self
    }

    /// Run once, on first activation
    pub fn on_created<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut Root) + 'static,
    {
        self.on_created = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Root {
        let mut reconciler = SceneReconciler::new(SceneGraph::new(), self.registry);
        let scene = reconciler.graph_mut().insert(Object::spatial("scene"));
        let camera = self.config.camera();
        let mut renderer = self.renderer;
        renderer.resize(self.config.width, self.config.height, self.config.pixel_ratio);

        Root {
            reconciler,
            scene,
            camera,
            size: self.config.size(),
            pixel_ratio: self.config.pixel_ratio,
            frame_loop: FrameLoop::new(self.scheduler),
            tasks: TaskQueue::new(),
            picker: self.picker,
            renderer,
            clock: self.clock,
            cursor_sink: self.cursor_sink,
            last_cursor: Cursor::Default,
            on_created: self.on_created,
        }
    }
}

/// One rendering session
pub struct Root {
    reconciler: SceneReconciler,
    scene: ObjectId,
    camera: Camera,
    size: Size,
    pixel_ratio: f32,
    frame_loop: FrameLoop,
    tasks: TaskQueue,
    picker: PointerPicker,
    renderer: Box<dyn SceneRenderer>,
    clock: Box<dyn Clock>,
    cursor_sink: Option<Box<dyn CursorSink>>,
    last_cursor: Cursor,
    on_created: Option<CreatedCallback>,
}

impl Root {
    pub fn builder(config: RootConfig) -> RootBuilder {
        RootBuilder::new(config)
    }

    /// Session with default configuration and collaborators
    pub fn new() -> Self {
        RootBuilder::new(RootConfig::default()).build()
    }

    /// Scene root object
    pub fn scene(&self) -> ObjectId {
        self.scene
    }

    pub fn graph(&self) -> &SceneGraph {
        self.reconciler.graph()
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        self.reconciler.graph_mut()
    }

    pub fn reconciler(&self) -> &SceneReconciler {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut SceneReconciler {
        &mut self.reconciler
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn state(&self) -> LoopState {
        self.frame_loop.state()
    }

    pub fn cursor(&self) -> Cursor {
        self.last_cursor
    }

    pub fn picker(&self) -> &PointerPicker {
        &self.picker
    }

    /// Build `node` and append it under the scene root
    pub fn render(&mut self, node: &VirtualNode) -> Result<Instance> {
        let scene = Instance::Node(self.scene);
        Ok(self.reconciler.mount(scene, node)?)
    }

    /// Start the frame loop.
    ///
    /// Activating a running session does nothing; a deactivated session
    /// cannot be restarted.
    pub fn activate(&mut self) -> Result<()> {
        match self.frame_loop.state() {
            LoopState::Running => return Ok(()),
            LoopState::Stopped => {
                return Err(RuntimeError::InvalidState("root was deactivated"))
            }
            LoopState::Idle => {}
        }

        if let Some(on_created) = self.on_created.take() {
            on_created(self);
        }
        self.frame_loop.start(self.clock.now());
        tracing::debug!(scene = ?self.scene, "root activated");
        Ok(())
    }

    /// Stop the frame loop for good and drop hover state
    pub fn deactivate(&mut self) {
        self.frame_loop.stop();
        self.picker.reset();
        tracing::debug!(scene = ?self.scene, "root deactivated");
    }

    /// Run one frame. Returns `false` without doing anything unless the
    /// session is active.
    pub fn tick(&mut self) -> bool {
        let Some(timing) = self.frame_loop.begin_frame(self.clock.now()) else {
            return false;
        };

        let mut state = FrameState::new(
            self.reconciler.graph_mut(),
            self.scene,
            &self.camera,
            self.size,
            timing,
        );
        self.frame_loop.run_frame(&mut state, self.renderer.as_mut());
        self.tasks.run_pending(self.reconciler.graph_mut());
        true
    }

    /// Viewport changed
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.camera.set_aspect(size.aspect());
        self.renderer.resize(size.width, size.height, self.pixel_ratio);
        tracing::debug!(width = size.width, height = size.height, "root resized");
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        self.frame_loop.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.frame_loop.unsubscribe(id)
    }

    /// Callback run before subscribers each frame
    pub fn set_frame_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        self.frame_loop.set_hook(hook);
    }

    /// Replace the renderer call with a custom draw step
    pub fn set_draw<F>(&mut self, draw: F)
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        self.frame_loop.set_draw(draw);
    }

    pub fn clear_draw(&mut self) {
        self.frame_loop.clear_draw();
    }

    /// Run `task` after the draw step of the next tick
    pub fn defer<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut SceneGraph) + 'static,
    {
        self.tasks.defer(task)
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.cancel(id)
    }

    /// Route a pointer event through the picker.
    ///
    /// Returns the handlers fired. Ignored once the session is deactivated.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<(ObjectId, HandlerKind)> {
        if self.frame_loop.state() == LoopState::Stopped {
            return Vec::new();
        }

        let viewport = Viewport {
            scene: self.scene,
            camera: &self.camera,
            size: self.size,
        };
        let position = Vec2::new(event.x, event.y);
        let graph = self.reconciler.graph_mut();
        let fired = match event.kind {
            PointerKind::Move => self.picker.pointer_move(graph, &viewport, position),
            PointerKind::Click => self.picker.click(graph, &viewport, position),
            PointerKind::Leave => self.picker.pointer_leave(graph),
        };

        let cursor = self.picker.cursor();
        if cursor != self.last_cursor {
            self.last_cursor = cursor;
            if let Some(sink) = self.cursor_sink.as_mut() {
                sink.set_cursor(cursor);
            }
        }
        fired
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicitly managed set of sessions
#[derive(Default)]
pub struct RootRegistry {
    roots: SlotMap<RootId, Root>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, root: Root) -> RootId {
        let id = self.roots.insert(root);
        tracing::debug!(?id, "root registered");
        id
    }

    pub fn get(&self, id: RootId) -> Option<&Root> {
        self.roots.get(id)
    }

    pub fn get_mut(&mut self, id: RootId) -> Option<&mut Root> {
        self.roots.get_mut(id)
    }

    pub fn try_get_mut(&mut self, id: RootId) -> Result<&mut Root> {
        self.roots.get_mut(id).ok_or(RuntimeError::UnknownRoot(id))
    }

    /// Deactivate and remove a session, handing it back
    pub fn destroy(&mut self, id: RootId) -> Result<Root> {
        let mut root = self.roots.remove(id).ok_or(RuntimeError::UnknownRoot(id))?;
        root.deactivate();
        tracing::debug!(?id, "root destroyed");
        Ok(root)
    }

    pub fn contains(&self, id: RootId) -> bool {
        self.roots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Tick every session, returning how many ran a frame
    pub fn tick_all(&mut self) -> usize {
        let mut ran = 0;
        for root in self.roots.values_mut() {
            if root.tick() {
                ran += 1;
            }
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_activate_lifecycle() {
        let mut root = Root::new();
        assert_eq!(root.state(), LoopState::Idle);
        assert!(!root.tick());

        root.activate().unwrap();
        root.activate().unwrap();
        assert!(root.tick());

        root.deactivate();
        assert!(!root.tick());
        assert!(matches!(root.activate(), Err(RuntimeError::InvalidState(_))));
    }

    #[test]
    fn test_on_created_runs_once() {
        let created = Rc::new(RefCell::new(0));
        let c = Rc::clone(&created);
        let mut root = Root::builder(RootConfig::default())
            .on_created(move |root| {
                *c.borrow_mut() += 1;
                let scene = root.scene();
                root.graph_mut()
                    .get_mut(scene)
                    .unwrap()
                    .set_field("name", "main".into());
            })
            .build();

        root.activate().unwrap();
        root.activate().unwrap();
        assert_eq!(*created.borrow(), 1);
        let scene = root.graph().get(root.scene()).unwrap();
        assert_eq!(scene.field("name").and_then(arbor_scene::Value::as_text), Some("main"));
    }

    #[test]
    fn test_resize_updates_camera_and_renderer() {
        struct Recorder(Rc<RefCell<Vec<(f32, f32, f32)>>>);
        impl SceneRenderer for Recorder {
            fn render(&mut self, _: &SceneGraph, _: ObjectId, _: &Camera) {}
            fn resize(&mut self, width: f32, height: f32, ratio: f32) {
                self.0.borrow_mut().push((width, height, ratio));
            }
        }

        let sizes = Rc::new(RefCell::new(Vec::new()));
        let mut root = Root::builder(RootConfig::default().with_size(100.0, 100.0).with_pixel_ratio(2.0))
            .renderer(Recorder(Rc::clone(&sizes)))
            .build();
        root.resize(Size::new(300.0, 150.0));

        assert_eq!(root.camera().aspect, 2.0);
        assert_eq!(*sizes.borrow(), vec![(100.0, 100.0, 2.0), (300.0, 150.0, 2.0)]);
    }

    #[test]
    fn test_clock_drives_frame_state() {
        let clock = Rc::new(ManualClock::new());
        let mut root = Root::builder(RootConfig::default())
            .clock(Rc::clone(&clock))
            .build();

        let deltas = Rc::new(RefCell::new(Vec::new()));
        let d = Rc::clone(&deltas);
        root.subscribe(move |state| d.borrow_mut().push(state.delta));

        root.activate().unwrap();
        clock.advance(Duration::from_millis(16));
        root.tick();
        clock.advance(Duration::from_millis(20));
        root.tick();
        assert_eq!(*deltas.borrow(), vec![Duration::from_millis(16), Duration::from_millis(20)]);
    }

    #[test]
    fn test_registry_create_destroy() {
        let mut roots = RootRegistry::new();
        let a = roots.create(Root::new());
        let b = roots.create(Root::new());
        roots.get_mut(a).unwrap().activate().unwrap();
        roots.get_mut(b).unwrap().activate().unwrap();
        assert_eq!(roots.tick_all(), 2);

        let root = roots.destroy(a).unwrap();
        assert_eq!(root.state(), LoopState::Stopped);
        assert!(!roots.contains(a));
        assert!(matches!(roots.destroy(a), Err(RuntimeError::UnknownRoot(_))));
        assert_eq!(roots.tick_all(), 1);
        assert_eq!(roots.len(), 1);
    }
}
