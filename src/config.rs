use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_surface_tilt() -> f64 { 30.0 }
fn default_surface_azimuth() -> f64 { 180.0 }
fn default_module_rated_power_w() -> f64 { 306.0 }
fn default_module_area_m2() -> f64 { 1.7 }
fn default_temperature_coefficient() -> f64 { -0.004 }
fn default_noct_c() -> f64 { 45.0 }
fn default_inverter_rated_power_w() -> f64 { 300.0 }
fn default_inverter_efficiency() -> f64 { 0.95 }
fn default_count() -> u32 { 1 }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid PV system configuration: {0}")]
    Invalid(String),
}

/// How the hour angle is derived from the civil hour of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HourAngleModel {
    /// `(hour - 12) * 15 + longitude`, no equation of time and no standard meridian.
    #[default]
    Simplified,
    /// Local apparent solar time: standard meridian offset plus equation of time.
    ApparentSolarTime,
}

/// Process-wide description of the simulated array. Built once, passed by reference
/// into every stage and echoed into each result.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PVSystemConfig {
    /// Panel tilt from horizontal (deg, 0..=90)
    #[serde(default = "default_surface_tilt")]
    pub surface_tilt: f64,
    /// Panel facing direction, clockwise from north (deg, 180 = south)
    #[serde(default = "default_surface_azimuth")]
    pub surface_azimuth: f64,
    /// Module nameplate power at STC (W)
    #[serde(default = "default_module_rated_power_w")]
    pub module_rated_power_w: f64,
    /// Module area (m²); with the rated power gives the STC efficiency
    #[serde(default = "default_module_area_m2")]
    pub module_area_m2: f64,
    /// Relative efficiency change per °C away from 25 °C
    #[serde(default = "default_temperature_coefficient")]
    pub temperature_coefficient_per_c: f64,
    /// Nominal Operating Cell Temperature (°C)
    #[serde(default = "default_noct_c")]
    pub noct_c: f64,
    /// AC ceiling of the inverter (W)
    #[serde(default = "default_inverter_rated_power_w")]
    pub inverter_rated_power_w: f64,
    #[serde(default = "default_inverter_efficiency")]
    pub inverter_efficiency: f64,
    #[serde(default = "default_count")]
    pub strings_per_inverter: u32,
    #[serde(default = "default_count")]
    pub modules_per_string: u32,
    /// Ground reflectance; 0 disables the ground-reflected POA term
    #[serde(default)]
    pub albedo: f64,
    #[serde(default)]
    pub hour_angle_model: HourAngleModel,
}

impl Default for PVSystemConfig {
    fn default() -> Self {
        Self {
            surface_tilt: default_surface_tilt(),
            surface_azimuth: default_surface_azimuth(),
            module_rated_power_w: default_module_rated_power_w(),
            module_area_m2: default_module_area_m2(),
            temperature_coefficient_per_c: default_temperature_coefficient(),
            noct_c: default_noct_c(),
            inverter_rated_power_w: default_inverter_rated_power_w(),
            inverter_efficiency: default_inverter_efficiency(),
            strings_per_inverter: default_count(),
            modules_per_string: default_count(),
            albedo: 0.0,
            hour_angle_model: HourAngleModel::default(),
        }
    }
}

impl PVSystemConfig {
    /// STC module efficiency: rated power over 1000 W/m² on the module area.
    pub fn rated_efficiency(&self) -> f64 {
        self.module_rated_power_w / (1000.0 * self.module_area_m2)
    }

    pub fn module_count(&self) -> u32 {
        self.strings_per_inverter * self.modules_per_string
    }

    /// Total collecting area behind the inverter (m²)
    pub fn array_area_m2(&self) -> f64 {
        self.module_area_m2 * self.module_count() as f64
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // `!(x > 0.0)` also rejects NaN
        if !(self.module_rated_power_w > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "module_rated_power_w must be positive, got {}",
                self.module_rated_power_w
            )));
        }
        if !(self.inverter_rated_power_w > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "inverter_rated_power_w must be positive, got {}",
                self.inverter_rated_power_w
            )));
        }
        if !(self.module_area_m2 > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "module_area_m2 must be positive, got {}",
                self.module_area_m2
            )));
        }
        if !(0.0..=90.0).contains(&self.surface_tilt) {
            return Err(ConfigError::Invalid(format!(
                "surface_tilt must be within [0, 90] degrees, got {}",
                self.surface_tilt
            )));
        }
        if !self.surface_azimuth.is_finite() {
            return Err(ConfigError::Invalid("surface_azimuth must be finite".to_string()));
        }
        if !(self.inverter_efficiency > 0.0 && self.inverter_efficiency <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "inverter_efficiency must be within (0, 1], got {}",
                self.inverter_efficiency
            )));
        }
        if self.strings_per_inverter == 0 || self.modules_per_string == 0 {
            return Err(ConfigError::Invalid(
                "strings_per_inverter and modules_per_string must be at least 1".to_string(),
            ));
        }
        if !self.temperature_coefficient_per_c.is_finite() {
            return Err(ConfigError::Invalid(
                "temperature_coefficient_per_c must be finite".to_string(),
            ));
        }
        if !(self.noct_c.is_finite() && self.noct_c > 20.0) {
            return Err(ConfigError::Invalid(format!(
                "noct_c must be above the 20 °C NOCT ambient, got {}",
                self.noct_c
            )));
        }
        if !(0.0..=1.0).contains(&self.albedo) {
            return Err(ConfigError::Invalid(format!(
                "albedo must be within [0, 1], got {}",
                self.albedo
            )));
        }
        if self.rated_efficiency() > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "module_rated_power_w {} W is not achievable on {} m²",
                self.module_rated_power_w, self.module_area_m2
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct BatchConfig {
    /// Worker count; defaults to the available parallelism
    #[serde(default)]
    pub workers: Option<usize>,
    /// Wall-clock cap for a whole run, in seconds
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub pv_system: PVSystemConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.pv_system.validate()?;
        Ok(config)
    }
}
