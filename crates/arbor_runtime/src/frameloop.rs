//! Frame scheduling
//!
//! A [`FrameLoop`] moves through `Idle -> Running -> Stopped`. While running,
//! each tick:
//!
//! 1. requests the next tick from the [`TickScheduler`]
//! 2. calls the per-frame hook, if set
//! 3. calls subscribers in registration order
//! 4. calls the draw override if set, else [`SceneRenderer::render`]
//!
//! Stopping is checked at the start of each tick: a stopped loop never
//! schedules, calls back or draws again.

use crate::config::Size;
use crate::render::SceneRenderer;
use arbor_scene::{Camera, ObjectId, SceneGraph};
use std::time::Duration;

/// Host hook that arranges for the next tick to run
pub trait TickScheduler {
    fn schedule_tick(&mut self);
}

impl<F: FnMut()> TickScheduler for F {
    fn schedule_tick(&mut self) {
        self()
    }
}

/// Scheduler for hosts that call `tick` on their own cadence
#[derive(Clone, Copy, Debug, Default)]
pub struct ManualTicks;

impl TickScheduler for ManualTicks {
    fn schedule_tick(&mut self) {}
}

/// Lifecycle of a frame loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    /// Terminal
    Stopped,
}

/// Handle returned by [`FrameLoop::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Frame timing computed at the start of a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    /// Time since the loop started
    pub elapsed: Duration,
    /// Time since the previous frame
    pub delta: Duration,
    /// Frame number, starting at 1
    pub frame: u64,
}

/// State handed to frame callbacks
pub struct FrameState<'a> {
    pub graph: &'a mut SceneGraph,
    pub scene: ObjectId,
    pub camera: &'a Camera,
    pub size: Size,
    pub elapsed: Duration,
    pub delta: Duration,
    pub frame: u64,
}

impl<'a> FrameState<'a> {
    pub fn new(
        graph: &'a mut SceneGraph,
        scene: ObjectId,
        camera: &'a Camera,
        size: Size,
        timing: FrameTiming,
    ) -> Self {
        Self {
            graph,
            scene,
            camera,
            size,
            elapsed: timing.elapsed,
            delta: timing.delta,
            frame: timing.frame,
        }
    }

    /// Frame delta in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Per-frame callback
pub type FrameCallback = Box<dyn FnMut(&mut FrameState<'_>)>;

/// Frame scheduler and callback registry
pub struct FrameLoop {
    state: LoopState,
    scheduler: Box<dyn TickScheduler>,
    subscribers: Vec<(SubscriptionId, FrameCallback)>,
    next_subscription: u64,
    hook: Option<FrameCallback>,
    draw: Option<FrameCallback>,
    started_at: Duration,
    last_frame: Duration,
    frame: u64,
}

impl FrameLoop {
    pub fn new(scheduler: Box<dyn TickScheduler>) -> Self {
        Self {
            state: LoopState::Idle,
            scheduler,
            subscribers: Vec::new(),
            next_subscription: 0,
            hook: None,
            draw: None,
            started_at: Duration::ZERO,
            last_frame: Duration::ZERO,
            frame: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Number of frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Start the loop and schedule the first tick.
    ///
    /// Returns `false` if the loop was not idle.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        self.started_at = now;
        self.last_frame = now;
        self.scheduler.schedule_tick();
        tracing::debug!("frame loop started");
        true
    }

    /// Stop the loop for good
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            tracing::debug!(frames = self.frame, "frame loop stopped");
        }
        self.state = LoopState::Stopped;
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove exactly the subscriber registered under `id`
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Callback run before subscribers each frame
    pub fn set_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    /// Replace the renderer call with a custom draw step
    pub fn set_draw<F>(&mut self, draw: F)
    where
        F: FnMut(&mut FrameState<'_>) + 'static,
    {
        self.draw = Some(Box::new(draw));
    }

    pub fn clear_draw(&mut self) {
        self.draw = None;
    }

    /// Start a frame: request the next tick and compute timing.
    ///
    /// Returns `None` (doing nothing) unless the loop is running.
    pub fn begin_frame(&mut self, now: Duration) -> Option<FrameTiming> {
        if !self.is_running() {
            return None;
        }
        self.scheduler.schedule_tick();

        self.frame += 1;
        let timing = FrameTiming {
            elapsed: now.saturating_sub(self.started_at),
            delta: now.saturating_sub(self.last_frame),
            frame: self.frame,
        };
        self.last_frame = now;
        Some(timing)
    }

    /// Run the hook, subscribers and draw step for one frame
    pub fn run_frame(&mut self, state: &mut FrameState<'_>, renderer: &mut dyn SceneRenderer) {
        if let Some(hook) = self.hook.as_mut() {
            hook(state);
        }
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(state);
        }
        match self.draw.as_mut() {
            Some(draw) => draw(state),
            None => renderer.render(state.graph, state.scene, state.camera),
        }
        tracing::trace!(frame = state.frame, "frame complete");
    }
}
