//! Low-priority work
//!
//! Tasks deferred to a [`TaskQueue`] run in FIFO order after the draw step
//! of the next tick. A task can be cancelled at any time before it runs.

use arbor_scene::SceneGraph;
use slotmap::{new_key_type, SlotMap};
use std::collections::VecDeque;

new_key_type! {
    /// Handle to a deferred task
    pub struct TaskId;
}

/// Deferred unit of work
pub type IdleTask = Box<dyn FnOnce(&mut SceneGraph)>;

/// FIFO queue of cancellable tasks
#[derive(Default)]
pub struct TaskQueue {
    tasks: SlotMap<TaskId, IdleTask>,
    order: VecDeque<TaskId>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut SceneGraph) + 'static,
    {
        let id = self.tasks.insert(Box::new(task));
        self.order.push_back(id);
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task queued so far, returning how many ran
    pub fn run_pending(&mut self, graph: &mut SceneGraph) -> usize {
        let mut ran = 0;
        let batch = std::mem::take(&mut self.order);
        for id in batch {
            // Cancelled tasks leave a stale id behind
            if let Some(task) = self.tasks.remove(id) {
                task(graph);
                ran += 1;
            }
        }
        if ran > 0 {
            tracing::trace!(ran, "idle tasks run");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_fifo_and_cancel() {
        let mut queue = TaskQueue::new();
        let mut graph = SceneGraph::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        queue.defer(move |_| l.borrow_mut().push(1));
        let l = Rc::clone(&log);
        let cancelled = queue.defer(move |_| l.borrow_mut().push(2));
        let l = Rc::clone(&log);
        queue.defer(move |_| l.borrow_mut().push(3));

        assert!(queue.cancel(cancelled));
        assert!(!queue.cancel(cancelled));
        assert!(!queue.is_pending(cancelled));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.run_pending(&mut graph), 2);
        assert_eq!(*log.borrow(), vec![1, 3]);
        assert!(queue.is_empty());
        assert_eq!(queue.run_pending(&mut graph), 0);
    }

    #[test]
    fn test_tasks_mutate_graph() {
        let mut queue = TaskQueue::new();
        let mut graph = SceneGraph::new();
        queue.defer(|graph| {
            graph.insert(arbor_scene::Object::new("deferred"));
        });
        queue.run_pending(&mut graph);
        assert_eq!(graph.len(), 1);
    }
}
