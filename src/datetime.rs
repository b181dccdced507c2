//! Date/time utilities for trackvault.
//!
//! The metadata store keeps timestamps as SQLite `datetime('now')` text in
//! UTC. These helpers parse that format back into [`DateTime<Utc>`] and
//! render it for listings and API payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Parse a stored datetime string into a UTC datetime.
///
/// Accepts RFC3339 as well as the SQLite format (`YYYY-MM-DD HH:MM:SS`,
/// assumed UTC). Returns `None` when the string matches neither.
pub fn parse_stored(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

/// Format a datetime string (stored as UTC) to the specified timezone.
///
/// # Arguments
///
/// * `datetime_str` - DateTime string in RFC3339 or SQLite format
/// * `timezone` - Timezone name (e.g., "Asia/Tokyo", "UTC")
/// * `format` - Output format string (e.g., "%Y/%m/%d %H:%M")
///
/// # Returns
///
/// Formatted datetime string, or the original string if parsing fails.
pub fn format_datetime(datetime_str: &str, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return datetime_str.to_string(),
    };

    match parse_stored(datetime_str) {
        Some(utc_dt) => utc_dt.with_timezone(&tz).format(format).to_string(),
        None => datetime_str.to_string(),
    }
}

/// Format a datetime string with the default listing format.
pub fn format_datetime_default(datetime_str: &str, timezone: &str) -> String {
    format_datetime(datetime_str, timezone, "%Y/%m/%d %H:%M")
}

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// The database stores times in UTC, so this function appends 'Z' to indicate UTC.
pub fn to_rfc3339(datetime_str: &str) -> String {
    format!("{}Z", datetime_str.replace(' ', "T"))
}
