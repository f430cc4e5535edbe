//! Time helpers — business time zone conversions
//!
//! Calendar logic (withdrawal days, billing windows) runs on dates in the
//! business time zone; the repository layer only sees `i64` Unix millis.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Date at 00:00:00 in the business zone → Unix millis
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Unix millis → instant in the business zone
pub fn from_millis(millis: i64, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz))
}

/// Current instant in the business zone
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    tz.from_utc_datetime(&Utc::now().naive_utc())
}

/// Parse the daily run time (HH:MM), falling back to 00:00
pub fn parse_run_at(run_at: &str) -> NaiveTime {
    NaiveTime::parse_from_str(run_at, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse settlement run time '{}': {}, falling back to 00:00",
            run_at,
            e
        );
        NaiveTime::MIN
    })
}

/// Parse an IANA zone name (e.g. "Asia/Dhaka")
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|e| format!("Invalid time zone '{}': {}", name, e))
}
