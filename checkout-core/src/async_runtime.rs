//! DES-based async runtime.
//!
//! This module provides the actor side of the runtime: a cloneable
//! [`SimHandle`] that actors capture to read the clock, spawn further actors
//! and suspend on simulated timeouts. All timing uses simulation time, never
//! wall-clock time.
//!
//! # Basic Usage
//!
//! ```
//! use checkout_core::{SimTime, Simulation};
//!
//! let mut sim = Simulation::default();
//! let handle = sim.handle();
//!
//! sim.spawn(async move {
//!     handle.timeout(1.5)?.await;
//!     handle.timeout(0.5)?.await;
//!     assert_eq!(handle.now().as_minutes(), 2.0);
//!     Ok(())
//! });
//!
//! sim.run_until(SimTime::from_minutes(10.0).unwrap()).unwrap();
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use tracing::{debug, trace, warn};

use crate::error::SimError;
use crate::scheduler::{ClockRef, Scheduler};
use crate::task::TaskId;
use crate::SimTime;

/// Cloneable handle to the simulation's scheduler.
///
/// Actors capture a handle to schedule their own resumption. The scheduler is
/// shared through `Rc<RefCell<_>>`: the runtime is single-threaded and never
/// holds a borrow while an actor is being polled.
#[derive(Clone)]
pub struct SimHandle {
    scheduler: Rc<RefCell<Scheduler>>,
}

impl SimHandle {
    pub(crate) fn new(scheduler: Rc<RefCell<Scheduler>>) -> Self {
        Self { scheduler }
    }

    pub(crate) fn with_scheduler<R>(&self, f: impl FnOnce(&mut Scheduler) -> R) -> R {
        f(&mut self.scheduler.borrow_mut())
    }

    /// Returns the current simulation time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.scheduler.borrow().time()
    }

    /// Returns a read-only view of the simulation clock.
    #[must_use]
    pub fn clock(&self) -> ClockRef {
        self.scheduler.borrow().clock()
    }

    /// Task currently being polled, `None` outside of actor code.
    #[must_use]
    pub fn current_task(&self) -> Option<TaskId> {
        self.scheduler.borrow().current_task()
    }

    /// Number of events waiting in the scheduler.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.scheduler.borrow().pending_events()
    }

    /// Spawn a new actor.
    ///
    /// The actor is first polled when the scheduler reaches the event created
    /// here, which is due at the current time and ordered after every event
    /// already scheduled for this instant.
    pub fn spawn<F>(&self, future: F) -> TaskId
    where
        F: Future<Output = Result<(), SimError>> + 'static,
    {
        let task_id = self.with_scheduler(|s| s.spawn(Box::pin(future)));
        debug!(%task_id, time = %self.now(), "Spawned actor");
        task_id
    }

    /// Suspend the calling actor for `delay` minutes of simulation time.
    ///
    /// # Errors
    ///
    /// A negative or non-finite delay is rejected here, before anything is
    /// scheduled, with [`SimError::InvalidDelay`].
    pub fn timeout(&self, delay: f64) -> Result<Timeout, SimError> {
        let deadline = self.now().checked_add_minutes(delay)?;
        Ok(Timeout {
            handle: self.clone(),
            deadline,
            registered: false,
        })
    }

    /// Suspend the calling actor until the given simulation time.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTime`] if `deadline` is already in the past.
    pub fn timeout_until(&self, deadline: SimTime) -> Result<Timeout, SimError> {
        if deadline < self.now() {
            return Err(SimError::InvalidTime(deadline.as_minutes()));
        }
        Ok(Timeout {
            handle: self.clone(),
            deadline,
            registered: false,
        })
    }
}

impl std::fmt::Debug for SimHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimHandle").field("now", &self.now()).finish()
    }
}

/// A future that completes after a simulated delay.
///
/// Use [`SimHandle::timeout`] or [`SimHandle::timeout_until`] to create
/// instances. The first poll always suspends, even for a zero delay, so a
/// zero timeout lets every other actor due at the same instant run first.
#[must_use = "timeouts do nothing unless awaited"]
pub struct Timeout {
    handle: SimHandle,
    deadline: SimTime,
    registered: bool,
}

impl Timeout {
    /// Simulation time at which the timeout fires.
    pub fn deadline(&self) -> SimTime {
        self.deadline
    }
}

impl Future for Timeout {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.registered {
            return if self.handle.now() >= self.deadline {
                Poll::Ready(())
            } else {
                Poll::Pending
            };
        }

        let deadline = self.deadline;
        let registered = self.handle.with_scheduler(|s| match s.current_task() {
            Some(task) => s.schedule_at(deadline, task).map(|()| true),
            None => Ok(false),
        });

        match registered {
            Ok(true) => {
                trace!(%deadline, "Timeout registered");
                self.registered = true;
            }
            Ok(false) => warn!("Timeout polled outside of the simulation runtime"),
            // The deadline was validated against the clock when the timeout
            // was created and the clock is monotonic, so this only happens
            // for a timeout carried across runs.
            Err(error) => warn!(%error, "Timeout deadline already passed"),
        }
        Poll::Pending
    }
}
