use crate::config::PVSystemConfig;
use crate::models::simulation::PowerSample;

/// Irradiance at which NOCT is rated (W/m²)
const NOCT_IRRADIANCE: f64 = 800.0;
/// Ambient temperature at which NOCT is rated (°C)
const NOCT_AMBIENT: f64 = 20.0;
/// STC cell temperature (°C)
const STC_CELL_TEMP: f64 = 25.0;

fn estimate_cell_temperature(poa_global: f64, temp_air: f64, wind_speed: f64, noct_c: f64) -> f64 {
    // T_cell = T_air + (G / 800) * (NOCT - 20) * 9.5 / (5.7 + 3.8 * v)
    // The wind term is 1.0 at the 1 m/s NOCT rating wind.
    let wind_factor = 9.5 / (5.7 + 3.8 * wind_speed.max(0.0));
    temp_air + poa_global / NOCT_IRRADIANCE * (noct_c - NOCT_AMBIENT) * wind_factor
}

fn estimate_dc_power_w(poa_global: f64, efficiency: f64, config: &PVSystemConfig) -> f64 {
    // P = G * A * eta
    let dc = poa_global * config.array_area_m2() * efficiency;
    if dc.is_finite() { dc.max(0.0) } else { 0.0 }
}

/// Cell temperature (°C) of the array for the given POA irradiance and weather.
pub fn cell_temperature(poa_global: f64, temp_air: f64, wind_speed: f64, config: &PVSystemConfig) -> f64 {
    estimate_cell_temperature(poa_global, temp_air, wind_speed, config.noct_c)
}

/// Temperature-derated module efficiency
pub fn derated_efficiency(temp_cell: f64, config: &PVSystemConfig) -> f64 {
    config.rated_efficiency() * (1.0 + config.temperature_coefficient_per_c * (temp_cell - STC_CELL_TEMP))
}

/// Inverter output: conversion losses, then clipping at the rated AC power.
pub fn ac_power_w(dc_power_w: f64, config: &PVSystemConfig) -> f64 {
    (dc_power_w * config.inverter_efficiency)
        .min(config.inverter_rated_power_w)
        .max(0.0)
}

pub fn power(poa_global: f64, temp_air: f64, wind_speed: f64, config: &PVSystemConfig) -> PowerSample {
    let cell_temp_c = cell_temperature(poa_global, temp_air, wind_speed, config);
    let efficiency = derated_efficiency(cell_temp_c, config);
    let dc_power_w = estimate_dc_power_w(poa_global, efficiency, config);
    PowerSample {
        cell_temp_c,
        dc_power_w,
        ac_power_w: ac_power_w(dc_power_w, config),
    }
}
