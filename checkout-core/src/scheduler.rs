use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;
use tracing::trace;

use crate::error::SimError;
use crate::task::{ActorFuture, Task, TaskId};
use crate::SimTime;

/// Entry stored in the scheduler: the task to resume and the time when it is
/// supposed to be resumed.
///
/// Entries are ordered by due time, then by the sequence number assigned at
/// scheduling, so simultaneous events resume in the order they were scheduled.
#[derive(Debug, Clone, Copy)]
pub struct EventEntry {
    time: SimTime,
    sequence: u64,
    task: TaskId,
}

impl EventEntry {
    pub(crate) fn new(time: SimTime, sequence: u64, task: TaskId) -> Self {
        Self { time, sequence, task }
    }

    /// Due time of the event.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Insertion order, used as the tie-break for equal due times.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Task resumed when this event is processed.
    pub fn task(&self) -> TaskId {
        self.task
    }
}

impl PartialEq for EventEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventEntry {}

impl PartialOrd for EventEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse the ordering for min-heap behavior in BinaryHeap
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

type Clock = Rc<Cell<SimTime>>;

/// This struct exposes only immutable access to the simulation clock.
/// The clock itself is owned by the scheduler, while others can obtain `ClockRef`
/// to read the current simulation time.
///
/// # Example
///
/// ```
/// # use checkout_core::Scheduler;
/// let scheduler = Scheduler::default();
/// let clock_ref = scheduler.clock();
/// assert_eq!(clock_ref.time(), scheduler.time());
/// ```
#[derive(Debug, Clone)]
pub struct ClockRef {
    clock: Clock,
}

impl From<Clock> for ClockRef {
    fn from(clock: Clock) -> Self {
        Self { clock }
    }
}

impl ClockRef {
    /// Return the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }
}

/// Scheduler is used to keep the current time and information about the upcoming events.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Scheduler {
    next_sequence: u64,
    next_task_id: u64,
    events: BinaryHeap<EventEntry>,
    clock: Clock,
    // Actors spawned since the runtime last collected them.
    spawned: Vec<Task>,
    // Task being polled right now, if any.
    current_task: Option<TaskId>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            next_sequence: 0,
            next_task_id: 0,
            events: BinaryHeap::default(),
            clock: Rc::new(Cell::new(SimTime::default())),
            spawned: Vec::new(),
            current_task: None,
        }
    }
}

impl Scheduler {
    /// Schedules `task` to be resumed at `self.time() + delay` minutes.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDelay`] for a negative or non-finite delay.
    /// The event queue is left untouched in that case.
    pub fn schedule(&mut self, delay: f64, task: TaskId) -> Result<SimTime, SimError> {
        let time = self.time().checked_add_minutes(delay)?;
        self.push(time, task);
        Ok(time)
    }

    /// Schedules `task` to be resumed at `self.time()`.
    pub fn schedule_now(&mut self, task: TaskId) {
        let now = self.time();
        self.push(now, task);
    }

    /// Schedules `task` to be resumed at an absolute time, which must not lie
    /// in the past.
    pub fn schedule_at(&mut self, time: SimTime, task: TaskId) -> Result<(), SimError> {
        if time < self.time() {
            return Err(SimError::InvalidTime(time.as_minutes()));
        }
        self.push(time, task);
        Ok(())
    }

    fn push(&mut self, time: SimTime, task: TaskId) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!(%time, sequence, %task, "Event scheduled");
        self.events.push(EventEntry::new(time, sequence, task));
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.clock.get()
    }

    /// Returns a structure with immutable access to the simulation time.
    #[must_use]
    pub fn clock(&self) -> ClockRef {
        ClockRef {
            clock: Rc::clone(&self.clock),
        }
    }

    /// Returns a reference to the next scheduled event or `None` if none are left.
    pub fn peek(&self) -> Option<&EventEntry> {
        self.events.peek()
    }

    /// Removes and returns the next scheduled event or `None` if none are left.
    ///
    /// The clock advances to the event's due time.
    pub fn pop(&mut self) -> Option<EventEntry> {
        self.events.pop().inspect(|event| {
            debug_assert!(event.time() >= self.clock.get(), "clock moved backwards");
            self.clock.replace(event.time());
        })
    }

    /// Number of events still waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Registers a new actor and schedules its first resumption now.
    pub(crate) fn spawn(&mut self, future: ActorFuture) -> TaskId {
        let id = TaskId(self.next_task_id);
        self.next_task_id += 1;
        self.spawned.push(Task::new(id, future));
        self.schedule_now(id);
        id
    }

    pub(crate) fn take_spawned(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.spawned)
    }

    pub(crate) fn spawned_len(&self) -> usize {
        self.spawned.len()
    }

    /// Task currently being polled by the runtime.
    pub fn current_task(&self) -> Option<TaskId> {
        self.current_task
    }

    pub(crate) fn set_current_task(&mut self, task: Option<TaskId>) {
        self.current_task = task;
    }
}
