//! Display-ready event times
//!
//! Turns a screening's canonical timestamp and its doors-open offset into the
//! strings shown on the detail and listing pages.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Calendar date on the detail page, e.g. `Fri Oct 16 2026`
const DATE_FORMAT: &str = "%a %b %d %Y";
/// Clock time, e.g. `7:30:00 PM`
const TIME_FORMAT: &str = "%-I:%M:%S %p";
/// Numeric date on the listing page, e.g. `10/16/2026`
const SHORT_DATE_FORMAT: &str = "%-m/%-d/%Y";

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Error returned when a display zone name cannot be parsed
#[derive(Debug, Error)]
#[error("Unknown time zone '{0}', expected an IANA name such as 'America/New_York' or 'local'")]
pub struct InvalidZoneError(String);

/// The time zone used to render event times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    /// The zone of the machine rendering the page
    #[default]
    Local,
    /// A fixed IANA zone
    Named(Tz),
}

impl DisplayZone {
    /// Converts an instant to wall-clock time in this zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            DisplayZone::Local => instant.with_timezone(&Local).naive_local(),
            DisplayZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }
}

impl FromStr for DisplayZone {
    type Err = InvalidZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(DisplayZone::Local);
        }
        trimmed
            .parse::<Tz>()
            .map(DisplayZone::Named)
            .map_err(|_| InvalidZoneError(trimmed.to_string()))
    }
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayZone::Local => write!(f, "local"),
            DisplayZone::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

/// Derived temporal fields for one screening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Showtimes {
    pub event_at: DateTime<Utc>,
    pub doors_open_at: DateTime<Utc>,
    pub date_text: String,
    pub time_text: String,
    pub doors_open_time_text: String,
}

/// Derives the date, time and doors-open time for an event.
///
/// Doors open `doors_open_minutes` before `event_at`. An offset of zero
/// yields a doors-open time equal to the event time.
pub fn derive_showtimes(
    event_at: DateTime<Utc>,
    doors_open_minutes: f64,
    zone: &DisplayZone,
) -> Showtimes {
    let doors_open_at = doors_open_instant(event_at, doors_open_minutes);
    let event_local = zone.localize(event_at);

    Showtimes {
        event_at,
        doors_open_at,
        date_text: event_local.format(DATE_FORMAT).to_string(),
        time_text: event_local.format(TIME_FORMAT).to_string(),
        doors_open_time_text: zone.localize(doors_open_at).format(TIME_FORMAT).to_string(),
    }
}

/// Short numeric date used on the listing page.
pub fn short_date(instant: DateTime<Utc>, zone: &DisplayZone) -> String {
    zone.localize(instant).format(SHORT_DATE_FORMAT).to_string()
}

fn doors_open_instant(event_at: DateTime<Utc>, doors_open_minutes: f64) -> DateTime<Utc> {
    // `as` saturates and maps NaN to zero
    let millis = (doors_open_minutes * MILLIS_PER_MINUTE) as i64;
    TimeDelta::try_milliseconds(millis)
        .and_then(|offset| event_at.checked_sub_signed(offset))
        .unwrap_or_else(|| {
            warn!(
                doors_open_minutes,
                "Doors-open offset out of range, using event time"
            );
            event_at
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> DisplayZone {
        DisplayZone::Named(chrono_tz::UTC)
    }

    fn friday_evening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 19, 30, 0).unwrap()
    }

    #[test]
    fn test_formats_date_and_times() {
        let times = derive_showtimes(friday_evening(), 30.0, &utc());
        assert_eq!(times.date_text, "Fri Oct 16 2026");
        assert_eq!(times.time_text, "7:30:00 PM");
        assert_eq!(times.doors_open_time_text, "7:00:00 PM");
    }

    #[test]
    fn test_zero_offset_equals_event_time() {
        let times = derive_showtimes(friday_evening(), 0.0, &utc());
        assert_eq!(times.doors_open_at, times.event_at);
        assert_eq!(times.doors_open_time_text, times.time_text);
    }

    #[test]
    fn test_doors_never_open_after_event() {
        for minutes in [0.0, 0.5, 1.0, 15.0, 45.0, 90.0, 1440.0, 10_000.0] {
            let times = derive_showtimes(friday_evening(), minutes, &utc());
            assert!(
                times.doors_open_at <= times.event_at,
                "doors opened after event for offset {minutes}"
            );
        }
    }

    #[test]
    fn test_offset_can_cross_midnight() {
        let event = Utc.with_ymd_and_hms(2026, 10, 17, 0, 15, 0).unwrap();
        let times = derive_showtimes(event, 30.0, &utc());
        assert_eq!(times.date_text, "Sat Oct 17 2026");
        assert_eq!(times.time_text, "12:15:00 AM");
        assert_eq!(times.doors_open_time_text, "11:45:00 PM");
    }

    #[test]
    fn test_named_zone_shifts_wall_clock() {
        let event = Utc.with_ymd_and_hms(2026, 10, 16, 2, 0, 0).unwrap();
        let zone: DisplayZone = "America/Los_Angeles".parse().unwrap();
        let times = derive_showtimes(event, 0.0, &zone);
        assert_eq!(times.date_text, "Thu Oct 15 2026");
        assert_eq!(times.time_text, "7:00:00 PM");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date(friday_evening(), &utc()), "10/16/2026");
    }

    #[test]
    fn test_absurd_offset_falls_back_to_event_time() {
        let times = derive_showtimes(friday_evening(), f64::MAX, &utc());
        assert_eq!(times.doors_open_at, times.event_at);
    }

    #[test]
    fn test_parse_display_zone() {
        assert_eq!("local".parse::<DisplayZone>().unwrap(), DisplayZone::Local);
        assert_eq!(" Local ".parse::<DisplayZone>().unwrap(), DisplayZone::Local);
        assert_eq!(
            "Europe/Berlin".parse::<DisplayZone>().unwrap(),
            DisplayZone::Named(chrono_tz::Europe::Berlin)
        );
        assert!("Mars/Olympus_Mons".parse::<DisplayZone>().is_err());
        assert_eq!(DisplayZone::Named(chrono_tz::Europe::Berlin).to_string(), "Europe/Berlin");
    }
}
