//! Structured logging for discrete event simulation debugging
//!
//! Logging goes through `tracing`; this module installs a `tracing-subscriber`
//! formatter and provides the spans and event helpers the runtime and the
//! models built on it share.
//!
//! # How to Control Terminal Logging Output
//!
//! ## 1. Use `init_simulation_logging_with_level()` for specific levels
//! ```rust
//! use checkout_core::init_simulation_logging_with_level;
//! init_simulation_logging_with_level("debug");  // DEBUG and above
//! ```
//!
//! ## 2. Use Environment Variables (Most flexible)
//! ```bash
//! # Pool transitions
//! RUST_LOG=checkout_core::pool=debug checkout-sim
//!
//! # Every scheduled and processed event (very verbose)
//! RUST_LOG=checkout_core=trace checkout-sim
//! ```
//!
//! `RUST_LOG` wins over the level passed in code.
//!
//! ## 3. Log Level Guidelines:
//! - **TRACE**: Scheduler internals, one line per scheduled or processed event
//! - **DEBUG**: Pool transitions, spawned and completed actors
//! - **INFO**: Actor narration, simulation start and end
//! - **WARN**: Unusual conditions
//! - **ERROR**: Failed actors
//!
//! Every line emitted from inside the simulation carries the simulated time as
//! a `time` field.

use tracing::{info, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::SimTime;

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("warn,checkout_core={level},checkout_store={level},checkout_sim={level}").into()
    })
}

/// Initialize logging for the simulation with sensible defaults (INFO).
pub fn init_simulation_logging() -> bool {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is kept.
pub fn init_simulation_logging_with_level(level: &str) -> bool {
    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_level(true))
        .with(default_filter(level))
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
    installed
}

/// Initialize logging with custom configuration for advanced debugging
pub fn init_detailed_simulation_logging() -> bool {
    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(default_filter("trace"))
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
    installed
}

/// Create a span for tracking simulation execution
pub fn simulation_span(name: &str, seed: u64) -> Span {
    tracing::info_span!("simulation", name = name, seed = seed)
}

/// Create a span for one actor, e.g. `actor_span("customer", 7)`.
pub fn actor_span(kind: &'static str, id: u64) -> Span {
    tracing::info_span!("actor", kind = kind, id = id)
}

/// Logging utilities for common simulation events
pub mod events {
    use super::*;

    /// Log simulation start
    pub fn simulation_started(name: &str, horizon: SimTime) {
        info!(simulation = name, horizon = %horizon, "Simulation started");
    }

    /// Log simulation completion
    pub fn simulation_completed(
        name: &str,
        final_time: SimTime,
        events_processed: u64,
        abandoned_actors: usize,
    ) {
        info!(
            simulation = name,
            final_time = %final_time,
            events_processed,
            abandoned_actors,
            "Simulation completed"
        );
    }
}
