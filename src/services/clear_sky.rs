/// ============================================================
///  Clear-sky GHI estimate for records without a measured GHI
///
///   1. Air mass        – Kasten & Young (1989), ISA pressure
///                        correction from site altitude
///   2. Transmittances  – Bird & Hulstrom simplified: Rayleigh,
///                        ozone, aerosol (Linke 3), water vapour
///   3. Water vapour    – precipitable water from air temperature
///                        and relative humidity (Prata 1996)
///   4. Cloud cover     – Kasten & Czeplak (1980) attenuation
/// ============================================================

use crate::services::decomposition::extraterrestrial_radiation;

/// Linke turbidity for a typical continental atmosphere
const LINKE_TURBIDITY: f64 = 3.0;
const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Relative air mass (Kasten & Young 1989) scaled to station pressure.
pub fn air_mass(zenith_deg: f64, altitude_m: f64) -> f64 {
    let elevation_deg = 90.0 - zenith_deg;
    let am_rel = 1.0
        / (elevation_deg.to_radians().sin() + 0.50572 * (elevation_deg + 6.07995_f64).powf(-1.6364));
    let pressure_ratio = if altitude_m.abs() < 1e-5 {
        1.0
    } else {
        (1.0 - 2.25577e-5 * altitude_m.min(11_000.0)).powf(5.25588)
    };
    am_rel.max(1.0) * pressure_ratio
}

/// Precipitable water (cm) from air temperature (°C) and relative humidity (%).
pub fn precipitable_water(temp_air_c: f64, humidity_pct: f64) -> f64 {
    let e_sat = 6.108 * (17.27 * temp_air_c / (temp_air_c + 237.3)).exp(); // hPa
    let e = e_sat * humidity_pct.clamp(0.0, 100.0) / 100.0;
    (46.5 * e / (temp_air_c + 273.15)).clamp(0.1, 8.0)
}

// ─── Helper: back-scatter term for Bird diffuse ──────────────
#[inline]
fn ba_scatter_coeff(ta: f64) -> f64 {
    0.5 * (0.92 - ta.ln().abs() / 10.0).clamp(0.2, 0.5)
}

/// Clear-sky GHI (W/m²) on a horizontal surface. Zero with the sun below ~0.1°.
pub fn clear_sky_ghi(
    zenith_deg: f64,
    day_of_year: u32,
    altitude_m: f64,
    temp_air_c: f64,
    humidity_pct: Option<f64>,
) -> f64 {
    let elevation_deg = 90.0 - zenith_deg;
    if !(elevation_deg > 0.1) {
        return 0.0;
    }
    let sin_alpha = elevation_deg.to_radians().sin();
    let e0 = extraterrestrial_radiation(day_of_year);
    let am = air_mass(zenith_deg, altitude_m);

    // Rayleigh
    let tr = (-0.0903 * am.powf(0.84) * (1.0 + am - am.powf(1.01))).exp();
    // Ozone (standard column 0.3 atm-cm)
    let to = 1.0 - 0.0013 * am;
    // Aerosol
    let ta = (-0.09 * LINKE_TURBIDITY.powf(0.978) * am.powf(0.9455)).exp();
    // Water vapour absorptance (Bird)
    let u = precipitable_water(temp_air_c, humidity_pct.unwrap_or(DEFAULT_HUMIDITY_PCT)) * am;
    let tw = 1.0 - 2.4959 * u / ((1.0 + 79.034 * u).powf(0.6828) + 6.385 * u);

    let total_t = tr * to * ta * tw;
    let dni_cs = 0.9762 * e0 * total_t;
    let dhi_cs = 0.79 * e0 * sin_alpha * (1.0 - total_t) * (0.5 * (1.0 - tr) + ba_scatter_coeff(ta))
        / (1.0 - am + am.powf(1.02));
    (dni_cs * sin_alpha + dhi_cs).max(0.0)
}

/// Fraction of clear-sky GHI left under `cloud_cover_pct` percent cloud.
pub fn cloud_attenuation(cloud_cover_pct: f64) -> f64 {
    let n = (cloud_cover_pct / 100.0).clamp(0.0, 1.0);
    1.0 - 0.75 * n.powf(3.4)
}
