use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use checkout_core::{init_detailed_simulation_logging, init_simulation_logging_with_level};
use checkout_store::{run_store, StoreConfig};

/// Simulates a day at a store checkout with a dynamic cashier pool.
#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Configuration JSON file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Results dump path (JSON).
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Total number of cashiers.
    #[arg(long)]
    num_units: Option<usize>,

    /// Cashiers open at the start.
    #[arg(long)]
    initial_open_units: Option<usize>,

    /// Simulated minutes to run.
    #[arg(long)]
    horizon: Option<f64>,

    /// Mean minutes between arrivals.
    #[arg(long)]
    mean_interarrival_time: Option<f64>,

    /// Mean minutes of service.
    #[arg(long)]
    mean_service_time: Option<f64>,

    /// Minutes a repair takes.
    #[arg(long)]
    repair_duration: Option<f64>,

    /// Queue length above which another cashier opens.
    #[arg(long)]
    backlog_threshold: Option<usize>,

    /// Chance of a repair per arrival.
    #[arg(long)]
    repair_probability: Option<f64>,

    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (RUST_LOG takes precedence).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Trace everything, with source locations.
    #[arg(long)]
    detailed_logs: bool,
}

impl Args {
    fn store_config(&self) -> Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("cannot read config {}", path.display()))?;
                StoreConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => StoreConfig::default(),
        };

        if let Some(v) = self.num_units {
            config.num_units = v;
        }
        if let Some(v) = self.initial_open_units {
            config.initial_open_units = v;
        }
        if let Some(v) = self.horizon {
            config.simulation_horizon = v;
        }
        if let Some(v) = self.mean_interarrival_time {
            config.mean_interarrival_time = v;
        }
        if let Some(v) = self.mean_service_time {
            config.mean_service_time = v;
        }
        if let Some(v) = self.repair_duration {
            config.repair_duration = v;
        }
        if let Some(v) = self.backlog_threshold {
            config.backlog_threshold = v;
        }
        if let Some(v) = self.repair_probability {
            config.repair_probability = v;
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.detailed_logs {
        init_detailed_simulation_logging();
    } else {
        init_simulation_logging_with_level(&args.log_level);
    }

    let config = args.store_config()?;
    let report = run_store(config).context("simulation failed")?;

    info!(
        customers_arrived = report.customers_arrived,
        customers_served = report.customers.len(),
        repairs = report.repairs.len(),
        open_cashiers = report.pool.capacity,
        "Run finished"
    );

    if let Some(path) = &args.dump {
        let file =
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }
    Ok(())
}
