//! Actor tasks driven by the simulation runtime
//!
//! An actor is a future that suspends on simulated timeouts or pool
//! acquisitions. The runtime owns every spawned actor and identifies it by a
//! [`TaskId`]; events in the scheduler name the task they resume.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::SimError;

/// Unique identifier for actor tasks
///
/// Identifiers are handed out sequentially by the scheduler, so they are
/// reproducible across runs with the same spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// Boxed actor future, run on the simulation thread only.
pub(crate) type ActorFuture = Pin<Box<dyn Future<Output = Result<(), SimError>>>>;

/// A suspended actor owned by the runtime.
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) future: ActorFuture,
}

impl Task {
    pub(crate) fn new(id: TaskId, future: ActorFuture) -> Self {
        Self { id, future }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id() {
        let id1 = TaskId(1);
        let id2 = TaskId(1);
        let id3 = TaskId(2);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert!(id1 < id3);
        assert_eq!(id3.to_string(), "Task(2)");
    }

    #[test]
    fn test_task_debug_hides_future() {
        let task = Task::new(TaskId(7), Box::pin(async { Ok(()) }));
        let rendered = format!("{task:?}");
        assert!(rendered.contains("TaskId(7)"));
    }
}
