//! Calendar helpers for entry timestamps and display dates.

use crate::constants::{EDIT_DATE_FORMATS, ENTRY_DATE_FORMAT};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Formats the display date stored in `Entry::date`, e.g. `2024/1/10 08:05:03`.
pub fn format_display_date(when: &DateTime<Local>) -> String {
    when.format(ENTRY_DATE_FORMAT).to_string()
}

/// Local date-time for a millisecond timestamp.
pub fn local_from_millis(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

/// Local calendar day of a millisecond timestamp.
pub fn day_from_millis(millis: i64) -> Option<NaiveDate> {
    local_from_millis(millis).map(|dt| dt.date_naive())
}

/// Extracts the calendar day from a display date string.
///
/// The `Y/M/D` prefix written by [`format_display_date`] is tried first; other
/// common shapes (RFC 3339, ISO date-time, ISO date) are accepted as a
/// fallback. Returns `None` when nothing parses.
///
/// # Examples
///
/// ```
/// use dreamlog::journal::dates::parse_display_day;
/// use chrono::NaiveDate;
///
/// let day = parse_display_day("2023/5/20 12:00:00").unwrap();
/// assert_eq!(day, NaiveDate::from_ymd_opt(2023, 5, 20).unwrap());
///
/// let iso = parse_display_day("2023-05-20").unwrap();
/// assert_eq!(iso, day);
///
/// assert!(parse_display_day("yesterday-ish").is_none());
/// ```
pub fn parse_display_day(display: &str) -> Option<NaiveDate> {
    let trimmed = display.trim();
    let date_part = trimmed.split_whitespace().next()?;

    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() >= 3 {
        let year = parts[0].trim().parse::<i32>().ok()?;
        let month = parts[1].trim().parse::<u32>().ok()?;
        let day = parts[2].trim().parse::<u32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parses a date/time typed when editing an entry, such as `2024-03-05T07:30`
/// or `2024-03-05 07:30`, in the local zone.
///
/// Returns `None` for unparsable input and for local times that do not exist
/// or are ambiguous (daylight saving transitions).
pub fn parse_edit_datetime(input: &str) -> Option<DateTime<Local>> {
    let trimmed = input.trim();
    EDIT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).single())
}
