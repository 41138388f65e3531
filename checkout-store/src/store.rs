//! The store: cashier pool, arrival loop and run entry point.
//!
//! A run spawns the initial customers at time zero, then loops forever:
//! wait for the next arrival, spawn the customer, open another cashier if the
//! queue has grown past the backlog threshold, and occasionally send a
//! cashier to repair. The horizon ends the run.

use checkout_core::logging::events;
use checkout_core::{
    actor_span, simulation_span, ArrivalPattern, ExponentialDistribution, PoissonArrivals,
    ResourcePool, ServiceTimeDistribution, SimError, SimHandle, SimRng, SimTime, Simulation,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{info, Instrument};

use crate::config::StoreConfig;
use crate::customer::customer;
use crate::record::{RunLog, RunReport};
use crate::repair::repair;

const SIMULATION_NAME: &str = "checkout";

/// What every store actor needs. Cheap to clone.
#[derive(Clone)]
pub(crate) struct StoreContext {
    pub(crate) handle: SimHandle,
    pub(crate) pool: ResourcePool,
    pub(crate) log: RunLog,
    pub(crate) repair_duration: f64,
    service: Rc<RefCell<Box<dyn ServiceTimeDistribution>>>,
}

impl StoreContext {
    pub(crate) fn sample_service_time(&self) -> f64 {
        self.service.borrow_mut().sample()
    }

    fn spawn_customer(&self, id: u64) {
        self.handle
            .spawn(customer(self.clone(), id).instrument(actor_span("customer", id)));
    }

    fn spawn_repair(&self, cashier_id: usize) {
        let span = actor_span("repair", cashier_id as u64);
        self.handle.spawn(repair(self.clone(), cashier_id).instrument(span));
    }
}

/// A configured store, ready to run once.
pub struct Store {
    config: StoreConfig,
    rng: SimRng,
    arrivals: Box<dyn ArrivalPattern>,
    service: Box<dyn ServiceTimeDistribution>,
}

impl Store {
    /// Store with exponential interarrival and service times, all drawn from
    /// one generator seeded with `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the configuration is invalid.
    pub fn new(config: StoreConfig) -> Result<Self, SimError> {
        config.validate()?;
        let rng = SimRng::seed_from_u64(config.seed);
        let arrivals = PoissonArrivals::new(config.mean_interarrival_time, rng.clone())?;
        let service = ExponentialDistribution::new(config.mean_service_time, rng.clone())?;
        Self::with_distributions(config, arrivals, service, rng)
    }

    /// Store with caller-supplied arrival and service distributions. `rng`
    /// drives the repair trigger.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the configuration is invalid.
    pub fn with_distributions(
        config: StoreConfig,
        arrivals: impl ArrivalPattern + 'static,
        service: impl ServiceTimeDistribution + 'static,
        rng: SimRng,
    ) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            arrivals: Box::new(arrivals),
            service: Box::new(service),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Runs the store until the horizon.
    ///
    /// # Errors
    ///
    /// Returns the scheduling fault that stopped the run, if any.
    pub fn run(self) -> Result<RunReport, SimError> {
        let Store {
            config,
            rng,
            arrivals,
            service,
        } = self;
        let horizon = SimTime::from_minutes(config.simulation_horizon)?;

        let span = simulation_span(SIMULATION_NAME, config.seed);
        let _entered = span.enter();

        let mut sim = Simulation::default();
        let handle = sim.handle();
        let ctx = StoreContext {
            pool: ResourcePool::new(&handle, config.num_units, config.initial_open_units)?,
            handle,
            log: RunLog::default(),
            repair_duration: config.repair_duration,
            service: Rc::new(RefCell::new(service)),
        };

        events::simulation_started(SIMULATION_NAME, horizon);
        sim.spawn(control_loop(ctx.clone(), config.clone(), arrivals, rng));
        sim.run_until(horizon)?;
        events::simulation_completed(
            SIMULATION_NAME,
            sim.time(),
            sim.events_processed(),
            sim.active_tasks(),
        );

        Ok(RunReport {
            horizon,
            final_time: sim.time(),
            customers_arrived: ctx.log.arrivals(),
            customers: ctx.log.customers(),
            repairs: ctx.log.repairs(),
            pool: ctx.pool.snapshot(),
            events_processed: sim.events_processed(),
            config,
        })
    }
}

/// Validates `config` and runs a store with exponential distributions.
///
/// # Errors
///
/// Returns [`SimError::Configuration`] for an invalid configuration, or the
/// scheduling fault that stopped the run.
pub fn run_store(config: StoreConfig) -> Result<RunReport, SimError> {
    Store::new(config)?.run()
}

async fn control_loop(
    ctx: StoreContext,
    config: StoreConfig,
    mut arrivals: Box<dyn ArrivalPattern>,
    rng: SimRng,
) -> Result<(), SimError> {
    let initial = config.initial_open_units as u64;
    for id in 1..=initial {
        ctx.spawn_customer(id);
    }

    let mut next_id = initial + 1;
    loop {
        ctx.handle.timeout(arrivals.next_arrival_time())?.await;
        ctx.spawn_customer(next_id);
        next_id += 1;

        let pool = ctx.pool.snapshot();
        if pool.queue_len > config.backlog_threshold && pool.capacity < pool.max_capacity {
            let added = ctx.pool.raise_capacity(1);
            info!(
                time = %ctx.handle.now(),
                queued = pool.queue_len,
                added,
                open = ctx.pool.capacity(),
                "Opening another cashier"
            );
        }

        if rng.chance(config.repair_probability) {
            let capacity = ctx.pool.effective_capacity();
            if capacity > 0 {
                let cashier_id = config.num_units - capacity;
                ctx.handle.timeout(0.0)?.await;
                ctx.spawn_repair(cashier_id);
            }
        }
    }
}
