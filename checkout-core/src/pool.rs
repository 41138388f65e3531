//! Counted resource pool with an adjustable capacity.
//!
//! A [`ResourcePool`] hands out interchangeable units to actors. Acquisition
//! completes immediately while a unit is free and nobody is queued; otherwise
//! the actor joins a FIFO queue and is resumed once a unit is granted to it.
//!
//! Capacity can be raised and lowered while the simulation runs, between zero
//! and a fixed maximum. Lowering never takes a unit away from its holder: the
//! part of a reduction that would cut into busy units is deferred and applied
//! as those units are released.
//!
//! ```
//! use checkout_core::{ResourcePool, Simulation};
//!
//! let sim = Simulation::default();
//! let pool = ResourcePool::new(&sim.handle(), 4, 2).unwrap();
//!
//! assert_eq!(pool.raise_capacity(5), 2);
//! assert_eq!(pool.capacity(), 4);
//! assert_eq!(pool.lower_capacity(1), 1);
//! assert_eq!(pool.snapshot().capacity, 3);
//! ```

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use tracing::{debug, error, warn};

use crate::async_runtime::SimHandle;
use crate::error::SimError;
use crate::task::TaskId;
use crate::SimTime;

#[derive(Debug)]
struct Waiter {
    request_id: u64,
    task: Option<TaskId>,
    enqueued_at: SimTime,
    waker: Waker,
}

/// A queued acquisition, as reported by [`ResourcePool::pending_requests`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: u64,
    /// Actor waiting for the unit, if the request was made from one.
    pub task: Option<TaskId>,
    pub enqueued_at: SimTime,
}

/// Point-in-time view of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub capacity: usize,
    pub in_use: usize,
    pub queue_len: usize,
    pub max_capacity: usize,
    /// Capacity still to be removed as busy units are released.
    pub deferred_reduction: usize,
}

#[derive(Debug)]
struct PoolState {
    max_capacity: usize,
    capacity: usize,
    in_use: usize,
    deferred_reduction: usize,
    next_request_id: u64,

    // FIFO queue of outstanding acquisitions.
    queue: VecDeque<Waiter>,

    // Requests that have been granted a unit and removed from the queue, but
    // whose futures have not yet observed completion.
    ready: HashSet<u64>,
}

impl PoolState {
    fn grant_locked(&mut self) -> Vec<Waker> {
        let mut to_wake = Vec::new();
        while self.in_use < self.capacity {
            let Some(waiter) = self.queue.pop_front() else {
                break;
            };
            self.in_use += 1;
            self.ready.insert(waiter.request_id);
            to_wake.push(waiter.waker);
        }
        to_wake
    }

    fn release_locked(&mut self) -> Vec<Waker> {
        debug_assert!(self.in_use > 0, "release without a matching acquire");
        self.in_use = self.in_use.saturating_sub(1);
        if self.deferred_reduction > 0 {
            self.deferred_reduction -= 1;
            self.capacity -= 1;
        }
        self.grant_locked()
    }

    fn remove_waiter_locked(&mut self, request_id: u64) -> Option<Waiter> {
        let pos = self.queue.iter().position(|w| w.request_id == request_id)?;
        self.queue.remove(pos)
    }

    fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            capacity: self.capacity,
            in_use: self.in_use,
            queue_len: self.queue.len(),
            max_capacity: self.max_capacity,
            deferred_reduction: self.deferred_reduction,
        }
    }
}

fn wake_all(wakers: Vec<Waker>) {
    for w in wakers {
        w.wake();
    }
}

/// Shared handle to a counted resource pool. Clones refer to the same pool.
#[derive(Clone)]
pub struct ResourcePool {
    state: Rc<RefCell<PoolState>>,
    handle: SimHandle,
}

impl ResourcePool {
    /// Creates a pool with `max_capacity` units, `initial_capacity` of them
    /// available.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if `max_capacity` is zero or
    /// `initial_capacity` exceeds it.
    pub fn new(
        handle: &SimHandle,
        max_capacity: usize,
        initial_capacity: usize,
    ) -> Result<Self, SimError> {
        if max_capacity == 0 {
            return Err(SimError::Configuration(
                "pool maximum capacity must be positive".to_string(),
            ));
        }
        if initial_capacity > max_capacity {
            return Err(SimError::Configuration(format!(
                "initial capacity {initial_capacity} exceeds maximum {max_capacity}"
            )));
        }
        Ok(Self {
            state: Rc::new(RefCell::new(PoolState {
                max_capacity,
                capacity: initial_capacity,
                in_use: 0,
                deferred_reduction: 0,
                next_request_id: 0,
                queue: VecDeque::new(),
                ready: HashSet::new(),
            })),
            handle: handle.clone(),
        })
    }

    /// Request one unit. The returned future resolves to a [`PoolPermit`]
    /// that gives the unit back when released or dropped.
    pub fn acquire(&self) -> Acquire {
        Acquire {
            pool: self.clone(),
            request_id: None,
            completed: false,
        }
    }

    /// Adds up to `by` units of capacity and returns how many were added.
    ///
    /// Outstanding deferred reductions are cancelled first, then capacity
    /// grows up to the maximum. Queued requests are granted in FIFO order as
    /// far as the new capacity allows.
    pub fn raise_capacity(&self, by: usize) -> usize {
        let (added, wakers, snapshot) = {
            let mut state = self.state.borrow_mut();
            let cancelled = by.min(state.deferred_reduction);
            state.deferred_reduction -= cancelled;
            let grown = (by - cancelled).min(state.max_capacity - state.capacity);
            state.capacity += grown;
            let wakers = state.grant_locked();
            (cancelled + grown, wakers, state.snapshot())
        };
        if added < by {
            debug!(requested = by, added, max = snapshot.max_capacity, "Capacity raise clamped");
        }
        debug!(
            time = %self.handle.now(),
            capacity = snapshot.capacity,
            in_use = snapshot.in_use,
            queued = snapshot.queue_len,
            granted = wakers.len(),
            "Pool capacity raised"
        );
        wake_all(wakers);
        added
    }

    /// Removes up to `by` units of capacity and returns how many were taken,
    /// counting both units removed now and units newly deferred.
    ///
    /// Capacity never drops below the number of busy units; the remainder is
    /// deferred and removed one unit per release. A reduction larger than the
    /// capacity not already deferred is only partly accepted, so raising by
    /// the returned amount restores the pool exactly.
    pub fn lower_capacity(&self, by: usize) -> usize {
        let (removed, newly_deferred, snapshot) = {
            let mut state = self.state.borrow_mut();
            let removed = by.min(state.capacity - state.in_use);
            state.capacity -= removed;
            let room = state.capacity.saturating_sub(state.deferred_reduction);
            let newly_deferred = (by - removed).min(room);
            state.deferred_reduction += newly_deferred;
            (removed, newly_deferred, state.snapshot())
        };
        let accepted = removed + newly_deferred;
        if accepted < by {
            debug!(requested = by, accepted, "Capacity reduction clamped");
        }
        debug!(
            time = %self.handle.now(),
            removed,
            deferred = snapshot.deferred_reduction,
            capacity = snapshot.capacity,
            in_use = snapshot.in_use,
            "Pool capacity lowered"
        );
        accepted
    }

    /// Current capacity, busy units, queue length and pending reductions.
    pub fn snapshot(&self) -> PoolSnapshot {
        self.state.borrow().snapshot()
    }

    pub fn capacity(&self) -> usize {
        self.state.borrow().capacity
    }

    pub fn in_use(&self) -> usize {
        self.state.borrow().in_use
    }

    /// Capacity left once every deferred reduction has been applied.
    pub fn effective_capacity(&self) -> usize {
        let state = self.state.borrow();
        state.capacity.saturating_sub(state.deferred_reduction)
    }

    /// Units free to be granted right now.
    pub fn available(&self) -> usize {
        let state = self.state.borrow();
        state.capacity - state.in_use
    }

    /// Number of requests waiting for a unit.
    pub fn queue_len(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn max_capacity(&self) -> usize {
        self.state.borrow().max_capacity
    }

    /// Queued requests, head of the queue first.
    pub fn pending_requests(&self) -> Vec<PendingRequest> {
        self.state
            .borrow()
            .queue
            .iter()
            .map(|w| PendingRequest {
                request_id: w.request_id,
                task: w.task,
                enqueued_at: w.enqueued_at,
            })
            .collect()
    }

    fn release_unit(&self) {
        let (wakers, snapshot) = {
            let mut state = self.state.borrow_mut();
            let wakers = state.release_locked();
            (wakers, state.snapshot())
        };
        debug!(
            time = %self.handle.now(),
            capacity = snapshot.capacity,
            in_use = snapshot.in_use,
            queued = snapshot.queue_len,
            granted = wakers.len(),
            "Pool unit released"
        );
        wake_all(wakers);
    }
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

/// Future returned by [`ResourcePool::acquire`].
///
/// Dropping it before completion withdraws the request; a unit already
/// granted to it is handed on to the next waiter.
#[must_use = "acquisitions do nothing unless awaited"]
pub struct Acquire {
    pool: ResourcePool,
    request_id: Option<u64>,
    completed: bool,
}

impl Acquire {
    fn permit(&mut self) -> PoolPermit {
        self.completed = true;
        PoolPermit {
            pool: self.pool.clone(),
            released: false,
        }
    }
}

impl Future for Acquire {
    type Output = PoolPermit;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<PoolPermit> {
        if self.completed {
            warn!("Acquire polled after completion");
            return Poll::Pending;
        }

        let now = self.pool.handle.now();
        let task = self.pool.handle.current_task();
        let pool = self.pool.clone();
        let mut state = pool.state.borrow_mut();

        if let Some(request_id) = self.request_id {
            if state.ready.remove(&request_id) {
                drop(state);
                self.request_id = None;
                debug!(time = %now, request_id, "Queued request granted");
                return Poll::Ready(self.permit());
            }

            if let Some(w) = state.queue.iter_mut().find(|w| w.request_id == request_id) {
                w.waker = cx.waker().clone();
            } else {
                error!(request_id, "Request neither queued nor granted");
            }
            return Poll::Pending;
        }

        if state.queue.is_empty() && state.in_use < state.capacity {
            state.in_use += 1;
            drop(state);
            return Poll::Ready(self.permit());
        }

        let request_id = state.next_request_id;
        state.next_request_id += 1;
        state.queue.push_back(Waiter {
            request_id,
            task,
            enqueued_at: now,
            waker: cx.waker().clone(),
        });
        debug!(
            time = %now,
            request_id,
            queued = state.queue.len(),
            "Pool full, request queued"
        );
        drop(state);
        self.request_id = Some(request_id);
        Poll::Pending
    }
}

impl Drop for Acquire {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let Some(request_id) = self.request_id.take() else {
            return;
        };

        let granted = self.pool.state.borrow_mut().ready.remove(&request_id);
        if granted {
            // Granted but never observed: hand the unit on.
            self.pool.release_unit();
        } else {
            self.pool.state.borrow_mut().remove_waiter_locked(request_id);
        }
    }
}

/// One unit held from a [`ResourcePool`].
///
/// The unit returns to the pool on [`PoolPermit::release`] or when the permit
/// is dropped.
#[must_use = "dropping the permit releases the unit immediately"]
pub struct PoolPermit {
    pool: ResourcePool,
    released: bool,
}

impl PoolPermit {
    /// Gives the unit back, granting it to the head of the queue if anyone is
    /// waiting.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.pool.release_unit();
        }
    }
}

impl Drop for PoolPermit {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl std::fmt::Debug for PoolPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolPermit")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Execute, Executor, Simulation};

    fn t(minutes: f64) -> SimTime {
        SimTime::from_minutes(minutes).unwrap()
    }

    fn assert_invariant(pool: &ResourcePool) {
        let s = pool.snapshot();
        assert!(s.in_use <= s.capacity, "{s:?}");
        assert!(s.capacity <= s.max_capacity, "{s:?}");
        assert!(s.queue_len == 0 || s.in_use == s.capacity, "{s:?}");
    }

    /// Spawns an actor that holds a unit for `hold` minutes and records the
    /// grant time under `name`.
    fn spawn_user(
        sim: &mut Simulation,
        pool: &ResourcePool,
        name: &'static str,
        hold: f64,
        log: &Rc<RefCell<Vec<(&'static str, f64)>>>,
    ) {
        let (handle, pool, log) = (sim.handle(), pool.clone(), log.clone());
        sim.spawn(async move {
            let permit = pool.acquire().await;
            log.borrow_mut().push((name, handle.now().as_minutes()));
            handle.timeout(hold)?.await;
            permit.release();
            Ok(())
        });
    }

    #[test]
    fn test_new_validates_capacity() {
        let sim = Simulation::default();
        let handle = sim.handle();
        assert!(matches!(
            ResourcePool::new(&handle, 0, 0),
            Err(SimError::Configuration(_))
        ));
        assert!(ResourcePool::new(&handle, 2, 3).is_err());
        let pool = ResourcePool::new(&handle, 3, 0).unwrap();
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.max_capacity(), 3);
    }

    #[test]
    fn test_acquire_without_contention_does_not_suspend() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 2, 2).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "a", 1.0, &log);
        Executor::steps(1).execute(&mut sim).unwrap();

        assert_eq!(*log.borrow(), vec![("a", 0.0)]);
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_single_unit_serializes_same_time_requests() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 1, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "first", 3.0, &log);
        spawn_user(&mut sim, &pool, "second", 3.0, &log);
        sim.run_until(t(100.0)).unwrap();

        assert_eq!(*log.borrow(), vec![("first", 0.0), ("second", 3.0)]);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_grants_are_fifo() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 1, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["a", "b", "c", "d", "e"] {
            spawn_user(&mut sim, &pool, name, 1.0, &log);
        }
        let observed = pool.clone();
        sim.run_until_with(t(100.0), |_| assert_invariant(&observed))
            .unwrap();

        let names: Vec<_> = log.borrow().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        let times: Vec<_> = log.borrow().iter().map(|(_, t)| *t).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_pending_requests_report_queue() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 1, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "a", 5.0, &log);
        spawn_user(&mut sim, &pool, "b", 5.0, &log);
        spawn_user(&mut sim, &pool, "c", 5.0, &log);
        sim.run_until(SimTime::zero()).unwrap();

        let pending = pool.pending_requests();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].task, Some(TaskId(1)));
        assert_eq!(pending[1].task, Some(TaskId(2)));
        assert!(pending[0].request_id < pending[1].request_id);
        assert_eq!(pending[0].enqueued_at, SimTime::zero());
    }

    #[test]
    fn test_raise_capacity_clamps_and_grants_waiters() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 3, 0).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["a", "b", "c", "d"] {
            spawn_user(&mut sim, &pool, name, 10.0, &log);
        }
        let (handle, controller) = (sim.handle(), pool.clone());
        sim.spawn(async move {
            handle.timeout(2.0)?.await;
            assert_eq!(controller.raise_capacity(5), 3);
            Ok(())
        });
        sim.run_until(t(5.0)).unwrap();

        assert_eq!(*log.borrow(), vec![("a", 2.0), ("b", 2.0), ("c", 2.0)]);
        assert_eq!(
            pool.snapshot(),
            PoolSnapshot {
                capacity: 3,
                in_use: 3,
                queue_len: 1,
                max_capacity: 3,
                deferred_reduction: 0,
            }
        );
        assert_eq!(pool.raise_capacity(1), 0);
    }

    #[test]
    fn test_lower_capacity_defers_busy_units() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 4, 2).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "a", 4.0, &log);
        spawn_user(&mut sim, &pool, "b", 6.0, &log);
        sim.run_until(SimTime::zero()).unwrap();

        assert_eq!(pool.lower_capacity(1), 1);
        let s = pool.snapshot();
        assert_eq!((s.capacity, s.in_use, s.deferred_reduction), (2, 2, 1));
        assert_eq!(pool.effective_capacity(), 1);

        // Nothing can take the freed unit: the deferred reduction claims it.
        spawn_user(&mut sim, &pool, "c", 1.0, &log);
        sim.run_until(t(5.0)).unwrap();
        let s = pool.snapshot();
        assert_eq!((s.capacity, s.in_use, s.queue_len, s.deferred_reduction), (1, 1, 1, 0));

        sim.run_until(t(100.0)).unwrap();
        assert_eq!(log.borrow().last(), Some(&("c", 6.0)));
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_lower_capacity_removes_idle_units_first() {
        let sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 5, 3).unwrap();
        assert_eq!(pool.lower_capacity(2), 2);
        assert_eq!(pool.capacity(), 1);
        // Idle pool: deferral is capped, capacity cannot go negative.
        assert_eq!(pool.lower_capacity(4), 1);
        assert_eq!(pool.snapshot().deferred_reduction, 0);
        assert_eq!(pool.capacity(), 0);
    }

    #[test]
    fn test_raise_cancels_deferred_reduction() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 2, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "a", 5.0, &log);
        sim.run_until(SimTime::zero()).unwrap();

        assert_eq!(pool.lower_capacity(1), 1);
        assert_eq!(pool.snapshot().deferred_reduction, 1);
        assert_eq!(pool.raise_capacity(1), 1);
        let s = pool.snapshot();
        assert_eq!((s.capacity, s.deferred_reduction), (1, 0));

        sim.run_until(t(10.0)).unwrap();
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_overlapping_reductions_on_busy_unit_are_capacity_neutral() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 3, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let taken = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "busy", 5.0, &log);
        for _ in 0..2 {
            let (handle, outage, taken) = (sim.handle(), pool.clone(), taken.clone());
            sim.spawn(async move {
                let removed = outage.lower_capacity(1);
                taken.borrow_mut().push(removed);
                handle.timeout(10.0)?.await;
                outage.raise_capacity(removed);
                Ok(())
            });
        }
        let observed = pool.clone();
        sim.run_until_with(t(100.0), |_| assert_invariant(&observed))
            .unwrap();

        // Only one unit exists to take out; the second reduction gets nothing.
        assert_eq!(*taken.borrow(), vec![1, 0]);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.snapshot().deferred_reduction, 0);
    }

    #[test]
    fn test_lower_capacity_accepts_no_more_than_effective_capacity() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 4, 2).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        spawn_user(&mut sim, &pool, "a", 3.0, &log);
        spawn_user(&mut sim, &pool, "b", 3.0, &log);
        sim.run_until(SimTime::zero()).unwrap();

        assert_eq!(pool.lower_capacity(5), 2);
        assert_eq!(pool.effective_capacity(), 0);
        assert_eq!(pool.lower_capacity(1), 0);
        assert_eq!(pool.raise_capacity(2), 2);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_dropped_permit_releases() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 1, 1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (handle, holder) = (sim.handle(), pool.clone());
        sim.spawn(async move {
            let _permit = holder.acquire().await;
            handle.timeout(2.0)?.await;
            Ok(())
        });
        spawn_user(&mut sim, &pool, "next", 1.0, &log);
        sim.run_until(t(10.0)).unwrap();

        assert_eq!(*log.borrow(), vec![("next", 2.0)]);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_abandoned_acquire_leaves_queue() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 1, 0).unwrap();

        let (handle, waiter) = (sim.handle(), pool.clone());
        sim.spawn(async move {
            let mut acquire = Box::pin(waiter.acquire());
            // Poll once so the request is queued, then give up on it.
            std::future::poll_fn(|cx| {
                let _ = acquire.as_mut().poll(cx);
                Poll::Ready(())
            })
            .await;
            assert_eq!(waiter.queue_len(), 1);
            drop(acquire);
            assert_eq!(waiter.queue_len(), 0);
            handle.timeout(1.0)?.await;
            Ok(())
        });
        sim.run_until(t(10.0)).unwrap();

        assert_eq!(pool.raise_capacity(1), 1);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_units_are_conserved() {
        let mut sim = Simulation::default();
        let pool = ResourcePool::new(&sim.handle(), 3, 2).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (i, name) in ["a", "b", "c", "d", "e", "f", "g"].into_iter().enumerate() {
            spawn_user(&mut sim, &pool, name, 1.0 + i as f64 * 0.5, &log);
        }
        let (handle, controller) = (sim.handle(), pool.clone());
        sim.spawn(async move {
            handle.timeout(1.5)?.await;
            controller.lower_capacity(2);
            handle.timeout(2.0)?.await;
            controller.raise_capacity(3);
            Ok(())
        });
        let observed = pool.clone();
        sim.run_until_with(t(100.0), |_| assert_invariant(&observed))
            .unwrap();

        assert_eq!(log.borrow().len(), 7);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.queue_len(), 0);
    }
}
