//! Simulation time management

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::SimError;

/// Simulation time in minutes
///
/// SimTime represents a point in logical simulation time, measured in minutes
/// since the simulation start. Values are always finite and non-negative, so
/// the type is totally ordered and can key the scheduler's event queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimTime(f64);

impl SimTime {
    /// Create a new SimTime at the simulation start (time zero)
    pub const fn zero() -> Self {
        SimTime(0.0)
    }

    /// Create a SimTime from a number of minutes
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTime`] for negative, infinite or NaN input.
    pub fn from_minutes(minutes: f64) -> Result<Self, SimError> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(SimError::InvalidTime(minutes));
        }
        // Normalises -0.0 so equality and ordering agree.
        Ok(SimTime(minutes + 0.0))
    }

    /// Get the raw number of minutes
    pub const fn as_minutes(&self) -> f64 {
        self.0
    }

    /// Minutes elapsed since an earlier time, zero if `earlier` is later
    pub fn duration_since(&self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// Add a number of minutes to this SimTime
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDelay`] if `minutes` is negative or not finite.
    pub fn checked_add_minutes(&self, minutes: f64) -> Result<Self, SimError> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(SimError::InvalidDelay(minutes));
        }
        SimTime::from_minutes(self.0 + minutes)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> Self::Output {
        SimTime(self.0 + rhs.0)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = f64;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl TryFrom<f64> for SimTime {
    type Error = SimError;

    fn try_from(minutes: f64) -> Result<Self, Self::Error> {
        SimTime::from_minutes(minutes)
    }
}

impl From<SimTime> for f64 {
    fn from(time: SimTime) -> Self {
        time.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}min", self.0)
    }
}
