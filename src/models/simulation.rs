use serde::{Deserialize, Serialize};

use crate::config::PVSystemConfig;

// ─── Per-hour derived state ──────────────────────────────────────────────────

/// Sun position for one hour. Angles in degrees; azimuth clockwise from north.
/// `zenith > 90` means the sun is below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    pub declination: f64,
    /// Wrapped to [-180, 180); negative before solar noon
    pub hour_angle: f64,
    pub zenith: f64,
    pub azimuth: f64,
}

/// Horizontal irradiance split into its beam and diffuse parts (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IrradianceSample {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

impl IrradianceSample {
    pub const DARK: IrradianceSample = IrradianceSample { ghi: 0.0, dni: 0.0, dhi: 0.0 };
}

/// One interpolated hour of weather, ready for the POA and power stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyConditions {
    pub hour: u32,
    pub temp_air: f64,
    pub wind_speed: f64,
    pub position: SolarPosition,
    pub irradiance: IrradianceSample,
}

/// Irradiance on the tilted panel surface (W/m²)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    pub direct: f64,
    pub sky_diffuse: f64,
    pub ground_reflected: f64,
}

impl PoaIrradiance {
    pub fn global(&self) -> f64 {
        self.direct + self.sky_diffuse + self.ground_reflected
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSample {
    pub cell_temp_c: f64,
    pub dc_power_w: f64,
    pub ac_power_w: f64,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One hour of output. The first three fields are the generation profile; the
/// rest are the intermediate quantities it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HourlyGeneration {
    pub hour: u32,
    pub dc_power_w: f64,
    pub ac_power_w: f64,
    /// Horizontal irradiance (W/m²)
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
    /// Sun position (deg)
    pub solar_zenith: f64,
    pub solar_azimuth: f64,
    /// Plane-of-array irradiance (W/m²)
    pub poa_global: f64,
    pub cell_temp_c: f64,
}

/// Daily totals for one weather record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub daily_energy_dc_kwh: f64,
    pub daily_energy_ac_kwh: f64,
    pub peak_dc_power_w: f64,
    pub peak_ac_power_w: f64,
    /// AC over DC energy in percent; 0 on a day without DC energy
    pub system_efficiency_pct: f64,
    /// 24 entries, hour ascending
    pub hourly_generation: Vec<HourlyGeneration>,
}

/// What gets attached to a record under the `simulation` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutput {
    #[serde(flatten)]
    pub result: SimulationResult,
    pub pv_system: PVSystemConfig,
    pub timezone: String,
}
