//! DES waker utilities.
//!
//! Wakers handed to actor futures do not poll anything themselves. Waking one
//! records the task in a shared inbox; after each poll the runtime turns every
//! recorded wake into a scheduler event at the current simulation time, so a
//! resumed actor takes its place in the ordinary event order.
//!
//! # Usage
//!
//! ```rust,ignore
//! let inbox = WakeInbox::default();
//! let waker = task_waker(task_id, inbox.clone());
//! let mut cx = Context::from_waker(&waker);
//! let _ = future.poll(&mut cx);
//! for task in inbox.drain() { scheduler.schedule_now(task); }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Wake, Waker};

use crate::task::TaskId;

/// Shared list of tasks woken since the runtime last drained it.
#[derive(Debug, Clone, Default)]
pub(crate) struct WakeInbox {
    woken: Arc<Mutex<VecDeque<TaskId>>>,
}

impl WakeInbox {
    fn push(&self, task: TaskId) {
        self.woken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }

    /// Removes every recorded wake, oldest first.
    pub(crate) fn drain(&self) -> Vec<TaskId> {
        self.woken
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

struct TaskWaker {
    task: TaskId,
    inbox: WakeInbox,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.inbox.push(self.task);
    }
}

/// Create a DES-aware waker that records `task` in `inbox` when woken.
pub(crate) fn task_waker(task: TaskId, inbox: WakeInbox) -> Waker {
    Waker::from(Arc::new(TaskWaker { task, inbox }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waker_clone() {
        let inbox = WakeInbox::default();
        let waker = task_waker(TaskId(42), inbox.clone());

        let waker2 = waker.clone();
        let waker3 = waker2.clone();

        drop(waker);
        drop(waker3);
        waker2.wake();

        assert_eq!(inbox.drain(), vec![TaskId(42)]);
    }

    #[test]
    fn test_wakes_drain_in_order() {
        let inbox = WakeInbox::default();
        let a = task_waker(TaskId(1), inbox.clone());
        let b = task_waker(TaskId(2), inbox.clone());

        b.wake_by_ref();
        a.wake_by_ref();
        b.wake();

        assert_eq!(inbox.drain(), vec![TaskId(2), TaskId(1), TaskId(2)]);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_waker_will_wake() {
        let waker1 = task_waker(TaskId(1), WakeInbox::default());
        let waker2 = waker1.clone();

        assert!(waker1.will_wake(&waker2));
    }
}
