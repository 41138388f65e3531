//! A crowded day: customers every minute, slow checkout, frequent breakdowns.
//!
//! ```bash
//! cargo run -p checkout-store --example busy_saturday
//! RUST_LOG=checkout_core::pool=debug cargo run -p checkout-store --example busy_saturday
//! ```

use checkout_core::init_simulation_logging_with_level;
use checkout_store::{run_store, StoreConfig};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_simulation_logging_with_level("warn");

    let config = StoreConfig::builder()
        .num_units(6)
        .initial_open_units(2)
        .simulation_horizon(600.0)
        .mean_interarrival_time(1.0)
        .mean_service_time(4.0)
        .repair_probability(0.2)
        .build()?;
    let report = run_store(config)?;

    let served = report.customers.len();
    let mean_wait = if served == 0 {
        0.0
    } else {
        report.customers.iter().map(|c| c.wait_time).sum::<f64>() / served as f64
    };
    info!(served, mean_wait, "Day finished");

    println!(
        "{served} of {} customers served, {} repairs, {} cashiers open at closing",
        report.customers_arrived,
        report.repairs.len(),
        report.pool.capacity
    );
    println!("mean wait: {mean_wait:.2} minutes");
    Ok(())
}
