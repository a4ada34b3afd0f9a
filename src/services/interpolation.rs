//! Expands one daily weather record into 24 hourly samples.
//!
//! Inside the daylight window `[sunrise, sunrise + day_length]` temperature and
//! irradiance follow a half-sine over the normalized window position; outside it
//! temperature sits at the daily minimum and irradiance is zero.

use std::f64::consts::PI;

use crate::config::HourAngleModel;
use crate::models::simulation::{HourlyConditions, IrradianceSample};
use crate::models::weather::{IrradianceSource, WeatherRecord};
use crate::services::{clear_sky, decomposition, solar_geometry};

pub const HOURS_PER_DAY: usize = 24;

/// Normalized position of `hour` in the daylight window, `None` outside it.
pub fn daylight_position(hour: f64, sunrise_hour: f64, day_length: f64) -> Option<f64> {
    let x = (hour - sunrise_hour) / day_length;
    (0.0..=1.0).contains(&x).then_some(x)
}

/// Diurnal temperature: `temp_min` at night, half-sine up to `temp_max` over the day.
pub fn hourly_temperature(temp_min: f64, temp_max: f64, daylight: Option<f64>) -> f64 {
    match daylight {
        Some(x) => temp_min + (temp_max - temp_min) * (PI * x).sin(),
        None => temp_min,
    }
}

/// Daily GHI shaped as a half-sine whose daylight mean equals `ghi_daily`.
pub fn half_sine_ghi(ghi_daily: f64, daylight: Option<f64>) -> f64 {
    match daylight {
        Some(x) => ghi_daily * PI / 2.0 * (PI * x).sin(),
        None => 0.0,
    }
}

pub fn interpolate(record: &WeatherRecord, model: HourAngleModel) -> [HourlyConditions; HOURS_PER_DAY] {
    let doy = record.day_of_year();
    let day_length = record.day_length();
    let utc_offset_hours = record.utc_offset_hours();

    std::array::from_fn(|h| {
        let hour = h as f64;
        let daylight = daylight_position(hour, record.sunrise_hour, day_length);
        let position = match model {
            HourAngleModel::Simplified => {
                solar_geometry::geometry(record.date, hour, record.latitude, record.longitude)
            }
            HourAngleModel::ApparentSolarTime => solar_geometry::geometry_with(
                record.date,
                hour,
                record.latitude,
                record.longitude,
                model,
                utc_offset_hours,
            ),
        };
        let temp_air = hourly_temperature(record.temp_min, record.temp_max, daylight);

        let ghi = match (&record.irradiance, daylight) {
            (_, None) => 0.0,
            (IrradianceSource::Daily(ghi_daily), x) => half_sine_ghi(*ghi_daily, x),
            (IrradianceSource::Hourly(series), Some(_)) => series[h],
            (IrradianceSource::CloudCover, Some(_)) => {
                clear_sky::clear_sky_ghi(position.zenith, doy, record.altitude, temp_air, record.humidity)
                    * clear_sky::cloud_attenuation(record.cloud_cover)
            }
        };
        let irradiance = if ghi > 0.0 {
            decomposition::decompose(ghi, position.zenith, doy)
        } else {
            IrradianceSample::DARK
        };

        HourlyConditions {
            hour: h as u32,
            temp_air,
            wind_speed: record.wind_speed,
            position,
            irradiance,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(extra: serde_json::Value) -> WeatherRecord {
        let mut base = json!({
            "date": "2024-03-21",
            "latitude": 34.0837,
            "longitude": 74.7973,
            "temp_min": 15.0,
            "temp_max": 25.0
        });
        if let (Some(b), Some(e)) = (base.as_object_mut(), extra.as_object()) {
            b.extend(e.clone());
        }
        WeatherRecord::from_json(&base).unwrap()
    }

    #[test]
    fn test_daylight_window() {
        assert_eq!(daylight_position(5.0, 6.0, 12.0), None);
        assert_eq!(daylight_position(6.0, 6.0, 12.0), Some(0.0));
        assert_eq!(daylight_position(12.0, 6.0, 12.0), Some(0.5));
        assert_eq!(daylight_position(18.0, 6.0, 12.0), Some(1.0));
        assert_eq!(daylight_position(19.0, 6.0, 12.0), None);
    }

    #[test]
    fn test_temperature_profile() {
        let hours = interpolate(&record(json!({ "ghi_daily": 450.0 })), HourAngleModel::Simplified);
        assert_eq!(hours.len(), 24);
        for h in hours.iter().filter(|h| h.hour < 6 || h.hour > 18) {
            assert_eq!(h.temp_air, 15.0, "hour {}", h.hour);
        }
        assert!((hours[12].temp_air - 25.0).abs() < 1e-9);
        assert!(hours.iter().all(|h| h.temp_air >= 15.0 && h.temp_air <= 25.0 + 1e-9));
    }

    #[test]
    fn test_irradiance_only_inside_daylight_window() {
        let hours = interpolate(&record(json!({ "ghi_daily": 450.0 })), HourAngleModel::Simplified);
        for (h, c) in hours.iter().enumerate() {
            assert_eq!(c.hour as usize, h);
            if h < 6 || h > 18 {
                assert_eq!(c.irradiance, IrradianceSample::DARK, "hour {}", h);
            }
        }
        assert!(hours.iter().any(|c| c.irradiance.ghi > 0.0));
    }

    #[test]
    fn test_sun_below_horizon_gates_irradiance() {
        let hours = interpolate(&record(json!({ "ghi_daily": 450.0 })), HourAngleModel::Simplified);
        for c in hours.iter() {
            if c.position.zenith.to_radians().cos() <= 0.0 {
                assert_eq!(c.irradiance, IrradianceSample::DARK, "hour {}", c.hour);
            }
        }
    }

    #[test]
    fn test_hourly_series_is_used_as_measured() {
        let mut series = vec![0.0; 24];
        series[9] = 520.0;
        series[3] = 999.0; // outside the window, ignored
        let hours = interpolate(&record(json!({ "ghi_hourly_series": series })), HourAngleModel::Simplified);
        assert_eq!(hours[9].irradiance.ghi, 520.0);
        assert_eq!(hours[3].irradiance, IrradianceSample::DARK);
    }

    #[test]
    fn test_cloud_cover_estimate_darkens_with_clouds() {
        let clear = interpolate(&record(json!({ "cloud_cover": 0.0 })), HourAngleModel::Simplified);
        let overcast = interpolate(&record(json!({ "cloud_cover": 100.0 })), HourAngleModel::Simplified);
        let clear_sum: f64 = clear.iter().map(|c| c.irradiance.ghi).sum();
        let overcast_sum: f64 = overcast.iter().map(|c| c.irradiance.ghi).sum();
        assert!(clear_sum > 0.0);
        assert!((overcast_sum / clear_sum - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_day_does_not_panic() {
        let hours = interpolate(
            &record(json!({ "ghi_daily": 450.0, "sunrise_hour": 12.0, "sunset_hour": 12.0 })),
            HourAngleModel::Simplified,
        );
        // window clamps to [12, 13]; both ends sit on the zero of the half-sine
        assert!(hours.iter().all(|c| c.irradiance.ghi.abs() < 1e-9));
        assert!(hours.iter().all(|c| c.temp_air.is_finite()));
    }

    #[test]
    fn test_apparent_solar_time_uses_the_zone_offset() {
        // Srinagar resolves to Asia/Kolkata, a +05:30 zone
        let r = record(json!({ "ghi_daily": 450.0 }));
        let hours = interpolate(&r, HourAngleModel::ApparentSolarTime);
        let expected = solar_geometry::apparent_hour_angle(12.0, r.longitude, r.day_of_year(), 5.5);
        assert!((hours[12].position.hour_angle - expected).abs() < 1e-9);
        // the simplified model ignores the zone entirely
        let simplified = interpolate(&r, HourAngleModel::Simplified);
        assert!((simplified[12].position.hour_angle - 74.7973).abs() < 1e-9);
    }

    #[test]
    fn test_interpolation_is_repeatable() {
        let r = record(json!({ "ghi_daily": 300.0, "wind_speed": 2.5 }));
        assert_eq!(
            interpolate(&r, HourAngleModel::Simplified),
            interpolate(&r, HourAngleModel::Simplified)
        );
    }
}
