use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use log::{error, info, warn};
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::config::PVSystemConfig;
use crate::models::simulation::SimulationOutput;
use crate::models::weather::RecordError;
use crate::services::pipeline;

/// Outcome of one input record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    Simulated,
    /// Invalid or unreadable record, with the reason
    Skipped(String),
    /// Not reached before the batch time limit
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub workers: usize,
    pub time_limit: Option<Duration>,
}

#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    /// One entry per input record, in input order
    pub statuses: Vec<RecordStatus>,
    pub processed: usize,
    pub skipped: usize,
    pub abandoned: usize,
}

impl BatchReport {
    fn push(&mut self, status: RecordStatus) {
        match status {
            RecordStatus::Simulated => self.processed += 1,
            RecordStatus::Skipped(_) => self.skipped += 1,
            RecordStatus::Abandoned => self.abandoned += 1,
        }
        self.statuses.push(status);
    }
}

fn record_label(record: &Value) -> &str {
    record
        .get("date")
        .or_else(|| record.get("datetime"))
        .and_then(Value::as_str)
        .unwrap_or("?")
}

const SIMULATION_KEY: &str = "simulation";
const ERROR_KEY: &str = "simulation_error";

/// Sets `key` on the record. Any result or error left from an earlier run is
/// cleared first, so a record never carries both.
fn attach(record: &mut Value, key: &str, value: Value) {
    match record {
        Value::Object(map) => {
            map.remove(SIMULATION_KEY);
            map.remove(ERROR_KEY);
            map.insert(key.to_string(), value);
        }
        other => {
            let original = other.take();
            *other = json!({ "record": original, key: value });
        }
    }
}

/// Simulates every record on the blocking pool, at most `workers` at a time.
///
/// Returns the input records with a `simulation` (or `simulation_error`)
/// member attached, in input order, plus per-record statuses. Once the time
/// limit passes no further results are collected and the rest are abandoned.
pub async fn run_batch(
    records: Vec<Value>,
    config: Arc<PVSystemConfig>,
    options: BatchOptions,
) -> (Vec<Value>, BatchReport) {
    let total = records.len();
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    info!("[BATCH] {} records, {} workers", total, options.workers.max(1));

    let records: Vec<Arc<Value>> = records.into_iter().map(Arc::new).collect();
    let mut outcomes = stream::iter(records.iter().cloned().enumerate())
        .map(|(index, value)| {
            let config = Arc::clone(&config);
            async move {
                let result = tokio::task::spawn_blocking(move || pipeline::process_record(&value, &config))
                    .await
                    .unwrap_or_else(|e| Err(RecordError::Worker(e.to_string())));
                (index, result)
            }
        })
        .buffered(options.workers.max(1));

    let mut results: Vec<Option<Result<SimulationOutput, RecordError>>> = (0..total).map(|_| None).collect();
    loop {
        let next = match deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    warn!("[BATCH] time limit reached before the batch finished");
                    break;
                }
                match tokio::time::timeout_at(deadline, outcomes.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!("[BATCH] time limit reached before the batch finished");
                        break;
                    }
                }
            }
            None => outcomes.next().await,
        };
        let Some((index, result)) = next else { break };
        results[index] = Some(result);
    }
    // pending blocking tasks run to completion detached; their results are discarded
    drop(outcomes);

    let mut report = BatchReport::default();
    let mut output = Vec::with_capacity(total);
    for (index, (record, result)) in records.into_iter().zip(results).enumerate() {
        // only shared when a detached task still holds it after the time limit
        let mut record = Arc::try_unwrap(record).unwrap_or_else(|shared| (*shared).clone());
        let label = record_label(&record).to_string();
        let status = match result {
            Some(Ok(simulation)) => match serde_json::to_value(&simulation) {
                Ok(value) => {
                    info!(
                        "[RECORD] #{} {} | AC {:.3} kWh | DC {:.3} kWh | peak AC {:.1} W | {}",
                        index,
                        label,
                        simulation.result.daily_energy_ac_kwh,
                        simulation.result.daily_energy_dc_kwh,
                        simulation.result.peak_ac_power_w,
                        simulation.timezone
                    );
                    attach(&mut record, SIMULATION_KEY, value);
                    RecordStatus::Simulated
                }
                Err(e) => {
                    error!("[RECORD] #{} {} | failed to encode result: {}", index, label, e);
                    attach(&mut record, ERROR_KEY, json!(e.to_string()));
                    RecordStatus::Skipped(e.to_string())
                }
            },
            Some(Err(e)) => {
                match e {
                    RecordError::Worker(_) => error!("[RECORD] #{} {} | {}", index, label, e),
                    _ => warn!("[RECORD] #{} {} skipped | {}", index, label, e),
                }
                attach(&mut record, ERROR_KEY, json!(e.to_string()));
                RecordStatus::Skipped(e.to_string())
            }
            None => {
                attach(&mut record, ERROR_KEY, json!("abandoned: batch time limit reached"));
                RecordStatus::Abandoned
            }
        };
        report.push(status);
        output.push(record);
    }

    (output, report)
}
