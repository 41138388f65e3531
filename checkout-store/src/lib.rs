//! Retail checkout queue model built on `checkout-core`.
//!
//! Customers arrive at random, queue for one of a dynamically sized pool of
//! cashiers, are served and leave. Cashiers occasionally go into repair, and
//! the store opens more cashiers when the queue grows too long.
//!
//! # Example
//!
//! ```
//! use checkout_store::{run_store, StoreConfig};
//!
//! let config = StoreConfig::builder()
//!     .simulation_horizon(120.0)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let report = run_store(config).unwrap();
//!
//! for customer in &report.customers {
//!     assert!(customer.wait_time >= 0.0);
//! }
//! ```

pub mod builder;
pub mod config;
mod customer;
pub mod record;
mod repair;
pub mod store;

pub use builder::{
    validate_finite, validate_non_negative, validate_positive, validate_range, Validate,
    ValidationError, ValidationResult,
};
pub use config::{StoreConfig, StoreConfigBuilder};
pub use record::{CustomerRecord, RepairInterval, RunLog, RunReport};
pub use store::{run_store, Store};
