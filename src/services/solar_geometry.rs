/// ============================================================
///  Solar geometry
///
///   declination   – Cooper (1969), function of day of year only
///   hour angle    – simplified `(hour - 12) * 15 + longitude`, or
///                   local apparent solar time (Spencer EoT)
///   zenith        – spherical cosine rule
///   azimuth       – clockwise from north, morning/afternoon branch
///                   picked from the sign of the hour angle
/// ============================================================

use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;

use crate::config::HourAngleModel;
use crate::models::simulation::SolarPosition;

/// Solar declination (deg)
pub fn declination(day_of_year: u32) -> f64 {
    23.45 * (360.0 * (284.0 + day_of_year as f64) / 365.0).to_radians().sin()
}

/// Simplified hour angle (deg). Ignores the equation of time and the standard
/// meridian; civil hour 12 maps to `longitude`, not to solar noon.
pub fn hour_angle(hour: f64, longitude: f64) -> f64 {
    (hour - 12.0) * 15.0 + longitude
}

/// Equation of time (minutes, Spencer 1971)
pub fn equation_of_time(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (day_of_year as f64 - 1.0) / 365.0;
    229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin())
}

/// Hour angle from local apparent solar time (deg)
pub fn apparent_hour_angle(hour: f64, longitude: f64, day_of_year: u32, utc_offset_hours: f64) -> f64 {
    let lstm = 15.0 * utc_offset_hours; // standard meridian
    let tc_min = 4.0 * (longitude - lstm) + equation_of_time(day_of_year);
    let lst_h = hour + tc_min / 60.0;
    15.0 * (lst_h - 12.0)
}

/// Solar zenith (deg), always within [0, 180]
pub fn zenith(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let (lat, decl, omega) = (latitude.to_radians(), declination.to_radians(), hour_angle.to_radians());
    let cos_z = lat.sin() * decl.sin() + lat.cos() * decl.cos() * omega.cos();
    cos_z.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Solar azimuth (deg from north, clockwise) in [0, 360)
pub fn azimuth(latitude: f64, declination: f64, hour_angle: f64, zenith: f64) -> f64 {
    let (lat, decl, z) = (latitude.to_radians(), declination.to_radians(), zenith.to_radians());
    let denom = lat.cos() * z.sin();
    // sun at the zenith/nadir or observer on a pole: azimuth is undefined
    let cos_az = if denom.abs() > 1e-9 {
        (decl.sin() - lat.sin() * z.cos()) / denom
    } else {
        0.0
    };
    let az_abs = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
    // acos gives the eastern half (0..180). Morning sun (ω <= 0) is east of the
    // meridian and keeps it; afternoon sun (ω > 0) is mirrored to the west.
    if wrap_degrees(hour_angle) > 0.0 {
        (360.0 - az_abs) % 360.0
    } else {
        az_abs
    }
}

/// Wraps an angle to [-180, 180)
fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}

/// Sun position for a civil hour of `date` with the simplified hour angle.
pub fn geometry(date: NaiveDate, hour: f64, latitude: f64, longitude: f64) -> SolarPosition {
    geometry_with(date, hour, latitude, longitude, HourAngleModel::Simplified, 0.0)
}

/// Like [`geometry`] with a chosen hour angle model. `utc_offset_hours` only
/// matters for [`HourAngleModel::ApparentSolarTime`].
pub fn geometry_with(
    date: NaiveDate,
    hour: f64,
    latitude: f64,
    longitude: f64,
    model: HourAngleModel,
    utc_offset_hours: f64,
) -> SolarPosition {
    let doy = date.ordinal();
    let decl = declination(doy);
    let omega = match model {
        HourAngleModel::Simplified => hour_angle(hour, longitude),
        HourAngleModel::ApparentSolarTime => apparent_hour_angle(hour, longitude, doy, utc_offset_hours),
    };
    let zen = zenith(latitude, decl, omega);
    SolarPosition {
        declination: decl,
        hour_angle: wrap_degrees(omega),
        zenith: zen,
        azimuth: azimuth(latitude, decl, omega, zen),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_declination_extremes() {
        // doy 81 → 360 * 365 / 365 → sin(360°)
        assert!(declination(81).abs() < 1e-6, "equinox declination {}", declination(81));
        assert!(declination(172) > 23.4, "June solstice declination {}", declination(172));
        assert!(declination(355) < -23.4, "December solstice declination {}", declination(355));
    }

    #[test]
    fn test_overhead_sun_at_equator() {
        // 2023-03-22 is day 81
        let pos = geometry(day(2023, 3, 22), 12.0, 0.0, 0.0);
        assert!(pos.zenith < 1e-3, "zenith {}", pos.zenith);
        assert!(pos.azimuth.is_finite());
    }

    #[test]
    fn test_hour_angle_includes_longitude() {
        assert_eq!(hour_angle(12.0, 74.7973), 74.7973);
        assert_eq!(hour_angle(6.0, 0.0), -90.0);
        let pos = geometry(day(2024, 1, 1), 23.0, 34.0, 74.7973);
        // 165 + 74.8 wraps into the morning half
        assert_relative_eq!(pos.hour_angle, 239.7973 - 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_morning_and_afternoon_branches() {
        let d = day(2024, 6, 21);
        let am = geometry(d, 9.0, 45.0, 0.0);
        let pm = geometry(d, 15.0, 45.0, 0.0);
        assert!(am.azimuth > 0.0 && am.azimuth < 180.0, "morning azimuth {}", am.azimuth);
        assert!(pm.azimuth > 180.0 && pm.azimuth < 360.0, "afternoon azimuth {}", pm.azimuth);
        assert_relative_eq!(am.azimuth + pm.azimuth, 360.0, epsilon = 1e-9);
        assert_relative_eq!(am.zenith, pm.zenith, epsilon = 1e-9);
    }

    #[test]
    fn test_noon_sun_due_south_in_northern_winter() {
        let pos = geometry(day(2024, 12, 21), 12.0, 45.0, 0.0);
        assert_relative_eq!(pos.azimuth, 180.0, epsilon = 1e-3);
        // 90 - (90 - 45 - 23.45)
        assert!((pos.zenith - 68.45).abs() < 0.1, "zenith {}", pos.zenith);
    }

    #[test]
    fn test_night_zenith_is_still_computed() {
        let pos = geometry(day(2024, 6, 21), 0.0, 45.0, 0.0);
        assert!(pos.zenith > 90.0 && pos.zenith <= 180.0, "zenith {}", pos.zenith);
    }

    #[test]
    fn test_pole_does_not_produce_nan() {
        for hour in 0..24 {
            let pos = geometry(day(2024, 6, 21), hour as f64, 90.0, 0.0);
            assert!(pos.zenith.is_finite() && pos.azimuth.is_finite());
            assert!((0.0..=180.0).contains(&pos.zenith));
            assert!((0.0..360.0).contains(&pos.azimuth));
        }
    }

    #[test]
    fn test_apparent_solar_time_on_standard_meridian() {
        // On the standard meridian only the equation of time separates the two models
        for doy in [1, 45, 120, 200, 305] {
            let simplified = (10.0 - 12.0) * 15.0;
            let apparent = apparent_hour_angle(10.0, 75.0, doy, 5.0);
            assert!((apparent - simplified).abs() < 4.5, "doy {} differs by {}", doy, apparent - simplified);
        }
        let pos = geometry_with(day(2024, 3, 20), 12.0, 34.08, 74.80, HourAngleModel::ApparentSolarTime, 5.0);
        assert!(pos.hour_angle.abs() < 5.0, "hour angle at civil noon {}", pos.hour_angle);
    }
}
