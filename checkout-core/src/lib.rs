//! Core discrete event simulation engine.
//!
//! This crate provides the building blocks of a process-oriented discrete
//! event simulation: a logical clock, an event scheduler, a single-threaded
//! cooperative runtime for actors written as `async` code, and a counted
//! resource pool whose capacity can change while the simulation runs.
//!
//! # Architecture Overview
//!
//! - [`Simulation`]: owns the scheduler and every spawned actor. Use it to
//!   spawn the initial actors and to run until a horizon.
//! - [`SimHandle`]: a cloneable handle actors capture to read the clock,
//!   spawn further actors and suspend on [`Timeout`]s.
//! - [`ResourcePool`]: a FIFO counted resource; acquiring suspends the actor
//!   while every unit is busy.
//!
//! # Basic Usage
//!
//! ```rust
//! use checkout_core::{ResourcePool, SimTime, Simulation};
//!
//! let mut simulation = Simulation::default();
//! let handle = simulation.handle();
//! let pool = ResourcePool::new(&handle, 1, 1).unwrap();
//!
//! for _ in 0..2 {
//!     let (handle, pool) = (handle.clone(), pool.clone());
//!     simulation.spawn(async move {
//!         let permit = pool.acquire().await;
//!         handle.timeout(3.0)?.await;
//!         permit.release();
//!         Ok(())
//!     });
//! }
//!
//! simulation.run_until(SimTime::from_minutes(60.0).unwrap()).unwrap();
//! assert_eq!(simulation.time().as_minutes(), 6.0);
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`], a logical time in minutes. Events due at the
//! same time are processed in the order they were scheduled, which keeps runs
//! reproducible for a fixed random stream.

pub mod async_runtime;
pub mod dists;
pub mod error;
pub mod execute;
pub mod logging;
pub mod pool;
pub mod randomness;
pub mod scheduler;
pub mod task;
pub mod time;
mod waker;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::task::{Context, Poll};
use tracing::{debug, error, info, instrument, trace};

pub use async_runtime::{SimHandle, Timeout};
pub use dists::{
    ArrivalPattern, ConstantArrivalPattern, ConstantServiceTime, ExponentialDistribution,
    PoissonArrivals, ServiceTimeDistribution,
};
pub use error::SimError;
pub use execute::{Execute, Executor};
pub use logging::{
    actor_span, init_detailed_simulation_logging, init_simulation_logging,
    init_simulation_logging_with_level, simulation_span,
};
pub use pool::{Acquire, PendingRequest, PoolPermit, PoolSnapshot, ResourcePool};
pub use randomness::SimRng;
pub use scheduler::{ClockRef, EventEntry, Scheduler};
pub use task::TaskId;
pub use time::SimTime;

use task::Task;
use waker::{task_waker, WakeInbox};

/// Simulation struct that puts the scheduler and the actors together.
///
/// See the [crate-level documentation](index.html) for more information.
pub struct Simulation {
    handle: SimHandle,
    /// Suspended actors, keyed by task id.
    tasks: HashMap<TaskId, Task>,
    inbox: WakeInbox,
    events_processed: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            handle: SimHandle::new(Rc::new(RefCell::new(Scheduler::default()))),
            tasks: HashMap::new(),
            inbox: WakeInbox::default(),
            events_processed: 0,
        }
    }
}

impl Simulation {
    /// Returns a cloneable handle for actors to capture.
    #[must_use]
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn time(&self) -> SimTime {
        self.handle.now()
    }

    /// Returns a ClockRef for reading the simulation time.
    pub fn clock(&self) -> ClockRef {
        self.handle.clock()
    }

    /// Spawn an actor. Its first poll is scheduled at the current time.
    pub fn spawn<F>(&mut self, future: F) -> TaskId
    where
        F: std::future::Future<Output = Result<(), SimError>> + 'static,
    {
        self.handle.spawn(future)
    }

    /// Returns the time of the next scheduled event, or None if no events are scheduled.
    pub fn peek_next_event_time(&mut self) -> Option<SimTime> {
        self.flush_wakes();
        self.handle.with_scheduler(|s| s.peek().map(EventEntry::time))
    }

    /// Check if there are pending events
    pub fn has_pending_events(&mut self) -> bool {
        self.peek_next_event_time().is_some()
    }

    /// Number of actors that have been spawned and not yet completed.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len() + self.handle.with_scheduler(|s| s.spawned_len())
    }

    /// Number of events processed so far.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Performs one step of the simulation: pops the earliest event, advances
    /// the clock to it and resumes the bound actor.
    ///
    /// Returns `Ok(true)` if an event was processed and `Ok(false)` if the
    /// queue was empty.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ActorFailed`] wrapping the error an actor completed
    /// with. The failed actor is removed; the rest of the simulation is left
    /// as it was.
    pub fn step(&mut self) -> Result<bool, SimError> {
        self.flush_wakes();

        let Some(event) = self.handle.with_scheduler(Scheduler::pop) else {
            return Ok(false);
        };
        trace!(
            event_time = %event.time(),
            sequence = event.sequence(),
            task = %event.task(),
            "Processing simulation step"
        );

        self.collect_spawned();
        self.events_processed += 1;
        let outcome = self.poll_task(event.task());
        self.flush_wakes();
        outcome.map(|()| true)
    }

    /// Runs the simulation with the given executor.
    ///
    /// The stopping condition and other execution details depend on the executor used.
    /// See [`Execute`] and [`Executor`] for more details.
    #[instrument(skip(self, executor), fields(initial_time = %self.time()))]
    pub fn execute<E: Execute>(&mut self, executor: E) -> Result<(), SimError> {
        info!("Starting simulation execution");
        let result = executor.execute(self);
        info!(
            final_time = %self.time(),
            events_processed = self.events_processed,
            active_tasks = self.active_tasks(),
            "Simulation execution completed"
        );
        result
    }

    /// Runs until the event queue is empty or the next event is due after
    /// `horizon`. Actors still suspended at that point are abandoned.
    pub fn run_until(&mut self, horizon: SimTime) -> Result<(), SimError> {
        self.execute(Executor::timed(horizon))
    }

    /// Like [`Simulation::run_until`], calling `observer` after every step.
    pub fn run_until_with<F>(&mut self, horizon: SimTime, observer: F) -> Result<(), SimError>
    where
        F: FnMut(&Simulation),
    {
        self.execute(Executor::timed(horizon).side_effect(observer))
    }

    fn collect_spawned(&mut self) {
        for task in self.handle.with_scheduler(Scheduler::take_spawned) {
            self.tasks.insert(task.id, task);
        }
    }

    fn flush_wakes(&mut self) {
        let woken = self.inbox.drain();
        if woken.is_empty() {
            return;
        }
        let mut seen = HashSet::with_capacity(woken.len());
        self.handle.with_scheduler(|s| {
            for task in woken.into_iter().filter(|task| seen.insert(*task)) {
                s.schedule_now(task);
            }
        });
    }

    fn poll_task(&mut self, task_id: TaskId) -> Result<(), SimError> {
        let Some(task) = self.tasks.get_mut(&task_id) else {
            trace!(%task_id, "Ignoring wake for finished actor");
            return Ok(());
        };

        let waker = task_waker(task_id, self.inbox.clone());
        let mut cx = Context::from_waker(&waker);

        self.handle.with_scheduler(|s| s.set_current_task(Some(task_id)));
        let result = task.future.as_mut().poll(&mut cx);
        self.handle.with_scheduler(|s| s.set_current_task(None));

        match result {
            Poll::Pending => Ok(()),
            Poll::Ready(Ok(())) => {
                self.tasks.remove(&task_id);
                debug!(%task_id, time = %self.time(), "Actor completed");
                Ok(())
            }
            Poll::Ready(Err(err)) => {
                self.tasks.remove(&task_id);
                error!(%task_id, time = %self.time(), error = %err, "Actor failed");
                Err(SimError::ActorFailed {
                    task: task_id,
                    source: Box::new(err),
                })
            }
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        // Spawned-but-unpolled actors hold handles to the scheduler that owns
        // them; take them out before the scheduler goes away.
        let spawned = self.handle.with_scheduler(Scheduler::take_spawned);
        drop(spawned);
        self.tasks.clear();
    }
}
