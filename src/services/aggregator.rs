use crate::models::simulation::{HourlyGeneration, SimulationResult};

/// Length of one sample (h)
const SAMPLE_HOURS: f64 = 1.0;

/// Folds hourly DC/AC power into daily energy, peaks and system efficiency.
/// The returned `hourly_generation` is ordered by hour.
pub fn aggregate(hourly: &[HourlyGeneration]) -> SimulationResult {
    let mut hourly_generation = hourly.to_vec();
    hourly_generation.sort_by_key(|h| h.hour);

    let mut dc_wh = 0.0;
    let mut ac_wh = 0.0;
    let mut peak_dc_power_w: f64 = 0.0;
    let mut peak_ac_power_w: f64 = 0.0;
    for h in &hourly_generation {
        dc_wh += h.dc_power_w * SAMPLE_HOURS;
        ac_wh += h.ac_power_w * SAMPLE_HOURS;
        peak_dc_power_w = peak_dc_power_w.max(h.dc_power_w);
        peak_ac_power_w = peak_ac_power_w.max(h.ac_power_w);
    }

    let daily_energy_dc_kwh = dc_wh / 1000.0;
    let daily_energy_ac_kwh = ac_wh / 1000.0;
    let system_efficiency_pct = if daily_energy_dc_kwh > 0.0 {
        daily_energy_ac_kwh / daily_energy_dc_kwh * 100.0
    } else {
        0.0
    };

    SimulationResult {
        daily_energy_dc_kwh,
        daily_energy_ac_kwh,
        peak_dc_power_w,
        peak_ac_power_w,
        system_efficiency_pct,
        hourly_generation,
    }
}
