//! Error types for the simulation engine

use thiserror::Error;

use crate::task::TaskId;

/// Top-level error type for simulation operations
///
/// Configuration faults are raised before the scheduler starts, scheduling
/// faults at the call site that issued them. Reaching the horizon with actors
/// still suspended is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid delay: {0} (expected a finite, non-negative number of minutes)")]
    InvalidDelay(f64),

    #[error("Invalid simulation time: {0} (expected a finite, non-negative number of minutes)")]
    InvalidTime(f64),

    #[error("Actor {task} failed: {source}")]
    ActorFailed {
        task: TaskId,
        #[source]
        source: Box<SimError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimError {
    /// The error an actor completed with, looking through `ActorFailed`.
    pub fn root_cause(&self) -> &SimError {
        match self {
            SimError::ActorFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
