use serde_json::Value;

use crate::config::PVSystemConfig;
use crate::models::simulation::{HourlyGeneration, SimulationOutput};
use crate::models::weather::{RecordError, WeatherRecord};
use crate::services::{aggregator, interpolation, poa, power_model};

/// Runs the full hourly chain for one validated record.
///
/// Pure: the same record and configuration always give the same output.
pub fn simulate(record: &WeatherRecord, config: &PVSystemConfig) -> SimulationOutput {
    let conditions = interpolation::interpolate(record, config.hour_angle_model);

    let hourly: Vec<HourlyGeneration> = conditions
        .iter()
        .map(|c| {
            let irr = poa::poa(
                c.irradiance.dni,
                c.irradiance.dhi,
                c.irradiance.ghi,
                c.position.zenith,
                c.position.azimuth,
                config.surface_tilt,
                config.surface_azimuth,
                config.albedo,
            );
            let poa_global = irr.global();
            let p = power_model::power(poa_global, c.temp_air, c.wind_speed, config);

            #[cfg(feature = "verbose_log")]
            log::debug!(
                "[HOUR] {} {:02}h | zen {:6.2}° az {:6.2}° | GHI {:6.1} DNI {:6.1} DHI {:6.1} | POA {:6.1} | T_air {:5.1} T_cell {:5.1} | DC {:7.1} W AC {:7.1} W",
                record.date, c.hour, c.position.zenith, c.position.azimuth,
                c.irradiance.ghi, c.irradiance.dni, c.irradiance.dhi,
                poa_global, c.temp_air, p.cell_temp_c, p.dc_power_w, p.ac_power_w
            );

            HourlyGeneration {
                hour: c.hour,
                dc_power_w: p.dc_power_w,
                ac_power_w: p.ac_power_w,
                ghi: c.irradiance.ghi,
                dni: c.irradiance.dni,
                dhi: c.irradiance.dhi,
                solar_zenith: c.position.zenith,
                solar_azimuth: c.position.azimuth,
                poa_global,
                cell_temp_c: p.cell_temp_c,
            }
        })
        .collect();

    SimulationOutput {
        result: aggregator::aggregate(&hourly),
        pv_system: config.clone(),
        timezone: record.timezone_label(),
    }
}

/// Validates one raw JSON record and simulates it.
pub fn process_record(value: &Value, config: &PVSystemConfig) -> Result<SimulationOutput, RecordError> {
    let record = WeatherRecord::from_json(value)?;
    Ok(simulate(&record, config))
}
