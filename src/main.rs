mod batch;
mod config;
mod models;
mod services;
mod time;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use crate::batch::{BatchOptions, RecordStatus};
use crate::config::Config;
use crate::services::record_store;

/// Estimates the daily energy yield of a PV array for each daily weather record.
#[derive(Parser, Debug)]
#[command(name = "pv-yield-sim", version, about)]
struct Args {
    /// JSON file with one weather record or an array of records
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the records with their simulation results
    #[arg(short, long)]
    output: PathBuf,

    /// PV system / batch configuration (JSON); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parallel record workers [default: available cores]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Abandon records still pending after this many seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // 1. Load configuration
    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            let config = Config::default();
            config.pv_system.validate().context("built-in PV system defaults")?;
            config
        }
    };
    let pv = &config.pv_system;
    info!(
        "[CONFIG] {} x {} W modules, tilt {:.1}° az {:.1}°, inverter {:.0} W @ {:.1}%",
        pv.module_count(),
        pv.module_rated_power_w,
        pv.surface_tilt,
        pv.surface_azimuth,
        pv.inverter_rated_power_w,
        pv.inverter_efficiency * 100.0
    );

    // 2. Read records
    let records = record_store::load_records(&args.input)
        .with_context(|| format!("reading records from {}", args.input.display()))?;

    // 3. Simulate
    let workers = args
        .workers
        .or(config.batch.workers)
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));
    let time_limit = args
        .time_limit_secs
        .or(config.batch.time_limit_secs)
        .map(Duration::from_secs);
    let options = BatchOptions { workers, time_limit };
    let (output, report) = batch::run_batch(records, Arc::new(config.pv_system), options).await;

    // 4. Write results
    record_store::save_records(&args.output, &output)
        .with_context(|| format!("writing results to {}", args.output.display()))?;

    let mut skip_reasons: BTreeMap<&str, usize> = BTreeMap::new();
    for status in &report.statuses {
        if let RecordStatus::Skipped(reason) = status {
            *skip_reasons.entry(reason.as_str()).or_default() += 1;
        }
    }
    for (reason, count) in &skip_reasons {
        warn!("[BATCH] {} x skipped: {}", count, reason);
    }

    info!(
        "[BATCH] processed {} | skipped {} | abandoned {} -> {}",
        report.processed,
        report.skipped,
        report.abandoned,
        args.output.display()
    );
    Ok(())
}
