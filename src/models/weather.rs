use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::time::{self, LocalZone};

pub const DEFAULT_SUNRISE_HOUR: f64 = 6.0;
pub const DEFAULT_SUNSET_HOUR: f64 = 18.0;
/// Floor for `sunset - sunrise`, so nothing downstream divides by a zero-length day
pub const MIN_DAY_LENGTH_H: f64 = 1.0;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("worker failed: {0}")]
    Worker(String),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> RecordError {
    RecordError::InvalidField { field, reason: reason.into() }
}

/// Hour of day as the exporters write it: either a decimal hour or a clock string
/// (`06:45:12`, `2024-03-21T06:45:12`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HourOfDay {
    Decimal(f64),
    Clock(String),
}

impl HourOfDay {
    pub fn to_hours(&self) -> Option<f64> {
        match self {
            HourOfDay::Decimal(h) if h.is_finite() => Some(*h),
            HourOfDay::Decimal(_) => None,
            HourOfDay::Clock(s) => {
                let clock = s.rsplit('T').next()?.trim();
                let time = NaiveTime::parse_from_str(clock, "%H:%M:%S")
                    .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
                    .ok()?;
                Some(time.hour() as f64 + time.minute() as f64 / 60.0 + time.second() as f64 / 3600.0)
            }
        }
    }
}

/// Record as it arrives from the upstream exporter. Everything is optional here;
/// `WeatherRecord::try_from` decides what is required.
#[derive(Debug, Default, Deserialize)]
pub struct RawWeatherRecord {
    #[serde(alias = "datetime")]
    pub date: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    #[serde(alias = "tempmax")]
    pub temp_max: Option<f64>,
    #[serde(alias = "tempmin")]
    pub temp_min: Option<f64>,
    #[serde(alias = "temp")]
    pub temp_mean: Option<f64>,
    #[serde(alias = "average_ghi")]
    pub ghi_daily: Option<f64>,
    pub ghi_hourly_series: Option<Vec<f64>>,
    #[serde(alias = "cloudcover")]
    pub cloud_cover: Option<f64>,
    #[serde(alias = "windspeed")]
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(alias = "sunrise")]
    pub sunrise_hour: Option<HourOfDay>,
    #[serde(alias = "sunset")]
    pub sunset_hour: Option<HourOfDay>,
    pub timezone: Option<String>,
}

/// Where a record's irradiance comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum IrradianceSource {
    /// Mean GHI over the daylight window (W/m²)
    Daily(f64),
    /// Measured GHI for hours 0..=23 (W/m²)
    Hourly([f64; 24]),
    /// No measurement: clear-sky estimate attenuated by cloud cover
    CloudCover,
}

/// Fully populated, validated weather record.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub temp_max: f64,
    pub temp_min: f64,
    pub irradiance: IrradianceSource,
    /// Percent, 0..=100
    pub cloud_cover: f64,
    /// m/s, never negative
    pub wind_speed: f64,
    /// Relative humidity in percent, if reported
    pub humidity: Option<f64>,
    pub sunrise_hour: f64,
    pub sunset_hour: f64,
    pub timezone: LocalZone,
}

impl WeatherRecord {
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        let raw = RawWeatherRecord::deserialize(value)?;
        WeatherRecord::try_from(raw)
    }

    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    /// `sunset - sunrise`, clamped to at least one hour.
    pub fn day_length(&self) -> f64 {
        (self.sunset_hour - self.sunrise_hour).max(MIN_DAY_LENGTH_H)
    }

    /// UTC offset (h) of the record's zone on its date.
    pub fn utc_offset_hours(&self) -> f64 {
        self.timezone.offset_on(self.date).local_minus_utc() as f64 / 3600.0
    }

    /// IANA identifier of the resolved zone, e.g. `Asia/Kolkata`.
    pub fn timezone_label(&self) -> String {
        self.timezone.label()
    }
}

fn finite(field: &'static str, value: Option<f64>) -> Result<Option<f64>, RecordError> {
    match value {
        Some(v) if !v.is_finite() => Err(invalid(field, format!("{} is not a finite number", v))),
        other => Ok(other),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, RecordError> {
    let day = s.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| invalid("date", format!("`{}`: {}", s, e)))
}

fn hour_field(field: &'static str, value: Option<&HourOfDay>, default: f64) -> Result<f64, RecordError> {
    match value {
        None => Ok(default),
        Some(h) => h
            .to_hours()
            .ok_or_else(|| invalid(field, format!("cannot read an hour of day from {:?}", h))),
    }
}

impl TryFrom<RawWeatherRecord> for WeatherRecord {
    type Error = RecordError;

    fn try_from(raw: RawWeatherRecord) -> Result<Self, Self::Error> {
        let date = parse_date(raw.date.as_deref().ok_or(RecordError::MissingField("date"))?)?;
        let latitude = finite("latitude", raw.latitude)?.ok_or(RecordError::MissingField("latitude"))?;
        let longitude = finite("longitude", raw.longitude)?.ok_or(RecordError::MissingField("longitude"))?;

        // Out-of-range coordinates are recovered here rather than rejected
        let latitude = if (-90.0..=90.0).contains(&latitude) {
            latitude
        } else {
            warn!("[RECORD] {}: latitude {} out of range, clamped", date, latitude);
            latitude.clamp(-90.0, 90.0)
        };
        let longitude = if (-180.0..180.0).contains(&longitude) {
            longitude
        } else {
            let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
            warn!("[RECORD] {}: longitude {} out of range, wrapped to {}", date, longitude, wrapped);
            wrapped
        };

        let temp_max = finite("temp_max", raw.temp_max)?;
        let temp_min = finite("temp_min", raw.temp_min)?;
        let temp_mean = finite("temp_mean", raw.temp_mean)?;
        let lo = temp_min.or(temp_mean).or(temp_max).ok_or(RecordError::MissingField("temp_min"))?;
        let hi = temp_max.or(temp_mean).or(temp_min).ok_or(RecordError::MissingField("temp_max"))?;
        let (temp_min, temp_max) = if lo <= hi { (lo, hi) } else { (hi, lo) };

        let irradiance = match (raw.ghi_hourly_series, finite("ghi_daily", raw.ghi_daily)?) {
            (Some(series), _) => {
                let hourly: [f64; 24] = series.try_into().map_err(|s: Vec<f64>| {
                    invalid("ghi_hourly_series", format!("expected 24 hourly values, got {}", s.len()))
                })?;
                IrradianceSource::Hourly(hourly)
            }
            (None, Some(ghi)) => IrradianceSource::Daily(ghi.max(0.0)),
            (None, None) => IrradianceSource::CloudCover,
        };

        let sunrise_hour = hour_field("sunrise_hour", raw.sunrise_hour.as_ref(), DEFAULT_SUNRISE_HOUR)?;
        let sunset_hour = hour_field("sunset_hour", raw.sunset_hour.as_ref(), DEFAULT_SUNSET_HOUR)?;
        if sunset_hour - sunrise_hour < MIN_DAY_LENGTH_H {
            warn!(
                "[RECORD] {}: sunrise {:.2} h / sunset {:.2} h leave less than {} h of daylight, clamped",
                date, sunrise_hour, sunset_hour, MIN_DAY_LENGTH_H
            );
        }

        let explicit_zone = match raw.timezone.as_deref() {
            None => None,
            Some(tz) => Some(time::parse_zone(tz).ok_or_else(|| {
                invalid("timezone", format!("`{}` is neither an IANA zone nor a UTC offset", tz))
            })?),
        };

        Ok(WeatherRecord {
            date,
            latitude,
            longitude,
            altitude: finite("altitude", raw.altitude)?.unwrap_or(0.0),
            temp_max,
            temp_min,
            irradiance,
            cloud_cover: finite("cloud_cover", raw.cloud_cover)?.unwrap_or(0.0).clamp(0.0, 100.0),
            wind_speed: finite("wind_speed", raw.wind_speed)?.unwrap_or(0.0).max(0.0),
            humidity: finite("humidity", raw.humidity)?.map(|h| h.clamp(0.0, 100.0)),
            sunrise_hour,
            sunset_hour,
            timezone: time::zone_for(explicit_zone, longitude, latitude),
        })
    }
}
