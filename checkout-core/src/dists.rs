//! Distribution traits and implementations for arrival patterns and service times
//!
//! All values are simulated minutes. Random distributions draw from a shared
//! [`SimRng`], so a run is reproducible from its seed.

use rand_distr::Exp;

use crate::error::SimError;
use crate::randomness::SimRng;

/// Trait for generating arrival patterns
///
/// This trait abstracts over different arrival patterns (Poisson, constant,
/// ...).
pub trait ArrivalPattern {
    /// Minutes to wait before the next arrival.
    fn next_arrival_time(&mut self) -> f64;
}

/// Trait for sampling service times from a distribution
pub trait ServiceTimeDistribution {
    /// Minutes needed to serve one customer.
    fn sample(&mut self) -> f64;
}

fn validate_mean(what: &str, mean: f64) -> Result<f64, SimError> {
    if mean.is_finite() && mean > 0.0 {
        Ok(mean)
    } else {
        Err(SimError::Configuration(format!(
            "{what} must be a positive number of minutes, got {mean}"
        )))
    }
}

fn exp_with_mean(what: &str, mean: f64) -> Result<Exp<f64>, SimError> {
    let mean = validate_mean(what, mean)?;
    Exp::new(1.0 / mean).map_err(|e| SimError::Configuration(format!("{what}: {e}")))
}

// =============================================================================
// Arrival Pattern Implementations
// =============================================================================

/// Simple constant arrival pattern
///
/// Generates arrivals with a fixed inter-arrival time.
#[derive(Debug, Clone)]
pub struct ConstantArrivalPattern {
    inter_arrival_time: f64,
}

impl ConstantArrivalPattern {
    pub fn new(inter_arrival_time: f64) -> Result<Self, SimError> {
        Ok(Self {
            inter_arrival_time: validate_mean("inter-arrival time", inter_arrival_time)?,
        })
    }
}

impl ArrivalPattern for ConstantArrivalPattern {
    fn next_arrival_time(&mut self) -> f64 {
        self.inter_arrival_time
    }
}

/// Poisson arrival pattern
///
/// Generates arrivals according to a Poisson process with exponentially
/// distributed inter-arrival times.
#[derive(Debug, Clone)]
pub struct PoissonArrivals {
    mean: f64,
    rng: SimRng,
    exp_dist: Exp<f64>,
}

impl PoissonArrivals {
    /// Create a new Poisson arrival pattern
    ///
    /// # Arguments
    ///
    /// * `mean_inter_arrival` - Average minutes between arrivals
    /// * `rng` - Shared random source
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the mean is not positive and finite.
    pub fn new(mean_inter_arrival: f64, rng: SimRng) -> Result<Self, SimError> {
        Ok(Self {
            mean: mean_inter_arrival,
            exp_dist: exp_with_mean("mean inter-arrival time", mean_inter_arrival)?,
            rng,
        })
    }

    /// Arrivals per minute
    pub fn rate(&self) -> f64 {
        1.0 / self.mean
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl ArrivalPattern for PoissonArrivals {
    fn next_arrival_time(&mut self) -> f64 {
        self.rng.sample(&self.exp_dist)
    }
}

// =============================================================================
// Service Time Distribution Implementations
// =============================================================================

/// Constant service time distribution
#[derive(Debug, Clone)]
pub struct ConstantServiceTime {
    duration: f64,
}

impl ConstantServiceTime {
    pub fn new(duration: f64) -> Result<Self, SimError> {
        Ok(Self {
            duration: validate_mean("service time", duration)?,
        })
    }
}

impl ServiceTimeDistribution for ConstantServiceTime {
    fn sample(&mut self) -> f64 {
        self.duration
    }
}

/// Exponential service time distribution
///
/// Memoryless service times with the given mean.
#[derive(Debug, Clone)]
pub struct ExponentialDistribution {
    mean: f64,
    rng: SimRng,
    exp_dist: Exp<f64>,
}

impl ExponentialDistribution {
    /// # Errors
    ///
    /// Returns [`SimError::Configuration`] if the mean is not positive and finite.
    pub fn new(mean_service_time: f64, rng: SimRng) -> Result<Self, SimError> {
        Ok(Self {
            mean: mean_service_time,
            exp_dist: exp_with_mean("mean service time", mean_service_time)?,
            rng,
        })
    }

    pub fn mean_service_time(&self) -> f64 {
        self.mean
    }
}

impl ServiceTimeDistribution for ExponentialDistribution {
    fn sample(&mut self) -> f64 {
        self.rng.sample(&self.exp_dist)
    }
}
