//! Timezone resolution for weather records.
//!
//! A record either names its zone (IANA name or fixed UTC offset) or the zone
//! is looked up from its coordinates.

use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

// tzf-rs DefaultFinder is pre-compiled; built once, shared by all workers
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

/// Local civil zone of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalZone {
    /// IANA zone, carries DST and historical offsets
    Named(Tz),
    /// Fixed offset given by the record itself
    Fixed(FixedOffset),
}

impl LocalZone {
    /// IANA identifier, or `UTC±HH:MM` for a fixed offset.
    pub fn label(&self) -> String {
        match self {
            LocalZone::Named(tz) => tz.name().to_string(),
            LocalZone::Fixed(offset) => format_offset(*offset),
        }
    }

    /// UTC offset in force on `date`.
    pub fn offset_on(&self, date: NaiveDate) -> FixedOffset {
        match self {
            LocalZone::Named(tz) => tz.offset_from_utc_date(&date).fix(),
            LocalZone::Fixed(offset) => *offset,
        }
    }
}

pub fn format_offset(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("UTC{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
}

/// Parses an IANA name (`Asia/Kolkata`) or a fixed offset (`+05:30`,
/// `UTC-03:00`, `Z`).
pub fn parse_zone(s: &str) -> Option<LocalZone> {
    let t = s.trim();
    if let Ok(tz) = t.parse::<Tz>() {
        return Some(LocalZone::Named(tz));
    }
    let offset = t
        .strip_prefix("UTC")
        .or_else(|| t.strip_prefix("GMT"))
        .unwrap_or(t)
        .trim();
    if offset.is_empty() || offset == "Z" {
        return FixedOffset::east_opt(0).map(LocalZone::Fixed);
    }
    offset.parse::<FixedOffset>().ok().map(LocalZone::Fixed)
}

/// Resolve the IANA zone containing the given coordinates.
pub fn resolve_timezone(longitude: f64, latitude: f64) -> Option<Tz> {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);
    finder.get_tz_name(longitude, latitude).parse::<Tz>().ok()
}

/// Nautical zone `round(longitude / 15)` hours, for coordinates the finder
/// cannot place.
pub fn nautical_offset(longitude: f64) -> FixedOffset {
    let hours = (longitude / 15.0).round() as i32;
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| chrono::Utc.fix())
}

/// The record's own zone if given, else the zone at its coordinates.
pub fn zone_for(explicit: Option<LocalZone>, longitude: f64, latitude: f64) -> LocalZone {
    explicit
        .or_else(|| resolve_timezone(longitude, latitude).map(LocalZone::Named))
        .unwrap_or_else(|| LocalZone::Fixed(nautical_offset(longitude)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;
    use chrono_tz::Europe::Madrid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_from_coordinates() {
        assert_eq!(resolve_timezone(74.7973, 34.0837), Some(Kolkata));
        assert_eq!(resolve_timezone(-3.7038, 40.4168), Some(Madrid));
    }

    #[test]
    fn test_named_zone_offsets_follow_dst() {
        let kolkata = LocalZone::Named(Kolkata);
        assert_eq!(kolkata.offset_on(day(2024, 3, 21)).local_minus_utc(), 19800);
        assert_eq!(kolkata.label(), "Asia/Kolkata");

        let madrid = LocalZone::Named(Madrid);
        assert_eq!(madrid.offset_on(day(2023, 1, 15)).local_minus_utc(), 3600);
        assert_eq!(madrid.offset_on(day(2023, 7, 15)).local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_zone_forms() {
        assert_eq!(parse_zone("Asia/Kolkata"), Some(LocalZone::Named(Kolkata)));
        let fixed = |s: &str| match parse_zone(s) {
            Some(LocalZone::Fixed(o)) => Some(o.local_minus_utc()),
            _ => None,
        };
        assert_eq!(fixed("+05:30"), Some(19800));
        assert_eq!(fixed("UTC-03:00"), Some(-10800));
        assert_eq!(fixed("Z"), Some(0));
        assert_eq!(parse_zone("Mars/Olympus_Mons"), None);
        assert_eq!(parse_zone("+25:00"), None);
    }

    #[test]
    fn test_explicit_zone_wins_and_labels() {
        let explicit = parse_zone("+02:00");
        let zone = zone_for(explicit, 74.7973, 34.0837);
        assert_eq!(zone.label(), "UTC+02:00");
        assert_eq!(zone_for(None, 74.7973, 34.0837).label(), "Asia/Kolkata");
    }

    #[test]
    fn test_nautical_offset() {
        assert_eq!(nautical_offset(74.8).local_minus_utc(), 5 * 3600);
        assert_eq!(nautical_offset(-74.0).local_minus_utc(), -5 * 3600);
        assert_eq!(format_offset(nautical_offset(-3.7)), "UTC+00:00");
    }
}
