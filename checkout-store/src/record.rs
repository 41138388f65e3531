//! Records produced by a store run.
//!
//! Customers and repairs append to a shared [`RunLog`] when they complete; the
//! finished log is handed out in a [`RunReport`]. Records are never modified
//! once appended.

use checkout_core::{PoolSnapshot, SimTime};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::StoreConfig;

/// One served customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: u64,
    pub arrival_time: SimTime,
    pub service_start: SimTime,
    pub departure_time: SimTime,
    /// Minutes spent queueing.
    pub wait_time: f64,
    /// Minutes spent at the cashier.
    pub service_time: f64,
}

impl CustomerRecord {
    pub fn new(
        id: u64,
        arrival_time: SimTime,
        service_start: SimTime,
        departure_time: SimTime,
    ) -> Self {
        Self {
            id,
            arrival_time,
            service_start,
            departure_time,
            wait_time: service_start - arrival_time,
            service_time: departure_time - service_start,
        }
    }
}

/// One completed cashier repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairInterval {
    /// Label of the cashier, for logs and reports only.
    pub cashier_id: usize,
    pub start_time: SimTime,
    pub end_time: SimTime,
}

impl RepairInterval {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Default)]
struct LogInner {
    arrivals: u64,
    customers: Vec<CustomerRecord>,
    repairs: Vec<RepairInterval>,
}

/// Append-only log shared by the actors of one run. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    inner: Rc<RefCell<LogInner>>,
}

impl RunLog {
    pub(crate) fn record_arrival(&self) {
        self.inner.borrow_mut().arrivals += 1;
    }

    pub(crate) fn push_customer(&self, record: CustomerRecord) {
        self.inner.borrow_mut().customers.push(record);
    }

    pub(crate) fn push_repair(&self, interval: RepairInterval) {
        self.inner.borrow_mut().repairs.push(interval);
    }

    /// Customers that have arrived so far, served or not.
    pub fn arrivals(&self) -> u64 {
        self.inner.borrow().arrivals
    }

    /// Customers that have left the store, in spawn order. Ids are handed
    /// out as customers are spawned, so arrival times never decrease.
    pub fn customers(&self) -> Vec<CustomerRecord> {
        let mut customers = self.inner.borrow().customers.clone();
        customers.sort_by_key(|c| c.id);
        customers
    }

    /// Completed repairs, in completion order.
    pub fn repairs(&self) -> Vec<RepairInterval> {
        self.inner.borrow().repairs.clone()
    }
}

/// Everything a run hands to reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: StoreConfig,
    pub horizon: SimTime,
    /// Time of the last processed event.
    pub final_time: SimTime,
    pub customers_arrived: u64,
    pub customers: Vec<CustomerRecord>,
    pub repairs: Vec<RepairInterval>,
    /// Pool state when the run stopped.
    pub pool: PoolSnapshot,
    pub events_processed: u64,
}
