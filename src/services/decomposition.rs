//! Erbs decomposition of measured GHI into beam (DNI) and diffuse (DHI) parts.
//!
//! Noisy GHI near the horizon is not treated as an error: any component that
//! comes out NaN or negative is coerced to 0 instead of being propagated.

use std::f64::consts::PI;

use crate::models::simulation::IrradianceSample;

/// Solar constant (W/m²)
pub const SOLAR_CONSTANT: f64 = 1361.0;
/// Floor for cos(zenith) in the clearness index denominator
const MIN_COS_ZENITH: f64 = 0.065;
/// Beyond this zenith the beam part is dropped and everything is diffuse
const MAX_BEAM_ZENITH: f64 = 87.0;

/// Eccentricity-corrected extraterrestrial normal irradiance (W/m², Spencer 1971)
pub fn extraterrestrial_radiation(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (day_of_year as f64 - 1.0) / 365.0;
    SOLAR_CONSTANT
        * (1.00011
            + 0.034221 * b.cos()
            + 0.00128 * b.sin()
            + 0.000719 * (2.0 * b).cos()
            + 0.000077 * (2.0 * b).sin())
}

/// Clearness index kt, clamped to [0, 1]. Caller guarantees `cos_zenith > 0`.
pub fn clearness_index(ghi: f64, cos_zenith: f64, dni_extra: f64) -> f64 {
    let kt = ghi / (dni_extra * cos_zenith.max(MIN_COS_ZENITH));
    if kt.is_finite() { kt.clamp(0.0, 1.0) } else { 0.0 }
}

/// Erbs et al. (1982) diffuse fraction as a function of kt
pub fn erbs_diffuse_fraction(kt: f64) -> f64 {
    if kt <= 0.22 {
        1.0 - 0.09 * kt
    } else if kt <= 0.8 {
        0.9511 - 0.1604 * kt + 4.388 * kt.powi(2) - 16.638 * kt.powi(3) + 12.336 * kt.powi(4)
    } else {
        0.165
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Splits `ghi` (W/m²) into DNI and DHI for a sun at `zenith` degrees.
/// Sun at or below the horizon gives an all-zero sample.
pub fn decompose(ghi: f64, zenith: f64, day_of_year: u32) -> IrradianceSample {
    let cos_z = zenith.to_radians().cos();
    let ghi = non_negative(ghi);
    if !(zenith < 90.0) || cos_z <= 0.0 || ghi == 0.0 {
        return IrradianceSample::DARK;
    }

    let kt = clearness_index(ghi, cos_z, extraterrestrial_radiation(day_of_year));
    let dhi = ghi * erbs_diffuse_fraction(kt);
    let dni = (ghi - dhi) / cos_z;

    if zenith > MAX_BEAM_ZENITH || !(dni >= 0.0) {
        // grazing sun: keep closure with an all-diffuse sky
        return IrradianceSample { ghi, dni: 0.0, dhi: ghi };
    }

    IrradianceSample {
        ghi,
        dni: non_negative(dni),
        dhi: non_negative(dhi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_extraterrestrial_follows_orbit() {
        // perihelion early January, aphelion early July
        assert!(extraterrestrial_radiation(3) > 1400.0);
        assert!(extraterrestrial_radiation(185) < 1320.0);
    }

    #[test]
    fn test_diffuse_fraction_is_continuous() {
        assert_relative_eq!(erbs_diffuse_fraction(0.0), 1.0);
        assert_relative_eq!(erbs_diffuse_fraction(1.0), 0.165);
        let below = erbs_diffuse_fraction(0.22);
        let above = erbs_diffuse_fraction(0.22 + 1e-9);
        assert!((below - above).abs() < 1e-3, "jump at 0.22: {} vs {}", below, above);
        let below = erbs_diffuse_fraction(0.8);
        let above = erbs_diffuse_fraction(0.8 + 1e-9);
        assert!((below - above).abs() < 1e-3, "jump at 0.8: {} vs {}", below, above);
    }

    #[test]
    fn test_clearness_index_is_clamped() {
        assert_eq!(clearness_index(5000.0, 1.0, 1361.0), 1.0);
        assert_eq!(clearness_index(-10.0, 1.0, 1361.0), 0.0);
        assert!(clearness_index(500.0, 1e-12, 1361.0) <= 1.0);
    }

    #[test]
    fn test_closure_in_daylight() {
        let zenith: f64 = 30.0;
        let s = decompose(600.0, zenith, 172);
        assert!(s.dni > 0.0 && s.dhi > 0.0);
        assert_relative_eq!(s.dni * zenith.to_radians().cos() + s.dhi, s.ghi, max_relative = 1e-9);
    }

    #[test]
    fn test_overcast_is_mostly_diffuse() {
        let s = decompose(80.0, 40.0, 100);
        assert!(s.dhi / s.ghi > 0.95, "diffuse fraction {}", s.dhi / s.ghi);
    }

    #[test]
    fn test_sun_below_horizon_is_dark() {
        for zenith in [90.0, 95.0, 120.0, 180.0] {
            assert_eq!(decompose(450.0, zenith, 80), IrradianceSample::DARK, "zenith {}", zenith);
        }
    }

    #[test]
    fn test_grazing_sun_is_all_diffuse() {
        let s = decompose(40.0, 88.5, 80);
        assert_eq!(s, IrradianceSample { ghi: 40.0, dni: 0.0, dhi: 40.0 });
    }

    #[test]
    fn test_bad_input_is_coerced_to_zero() {
        assert_eq!(decompose(f64::NAN, 30.0, 80), IrradianceSample::DARK);
        assert_eq!(decompose(-25.0, 30.0, 80), IrradianceSample::DARK);
        assert_eq!(decompose(100.0, f64::NAN, 80), IrradianceSample::DARK);
    }
}
