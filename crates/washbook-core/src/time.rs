//! Timestamp parsing and display formatting.
//!
//! The server hands back a mix of shapes: RFC 3339 instants written by the
//! client (`2025-06-25T04:30:00.000Z`), naive ISO strings
//! (`2025-06-25T10:00:00`) and SQLite `CURRENT_TIMESTAMP` values
//! (`2025-06-25 10:00:00`). Instants with an offset are shown in local time,
//! naive values are shown as written.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Placeholder for timestamps the server left empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// Parse any timestamp shape the server produces into local wall-clock time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `25 June 2025`. Unparseable input is returned unchanged.
pub fn format_date(s: &str) -> String {
    parse_date(s)
        .or_else(|| parse_timestamp(s).map(|dt| dt.date()))
        .map_or_else(|| s.to_string(), |d| d.format("%-d %B %Y").to_string())
}

/// `10:00 am`. Unparseable input is returned unchanged.
pub fn format_time(s: &str) -> String {
    parse_timestamp(s).map_or_else(|| s.to_string(), |dt| dt.format("%I:%M %P").to_string())
}

/// `25 Jun 2025, 10:00 am`, or `N/A` when the value is absent.
pub fn format_date_time(s: Option<&str>) -> String {
    match s.map(str::trim) {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(s) => parse_timestamp(s).map_or_else(
            || s.to_string(),
            |dt| dt.format("%-d %b %Y, %I:%M %P").to_string(),
        ),
    }
}

/// Human duration: under an hour in whole minutes, otherwise hours to one
/// decimal place.
pub fn format_duration(d: TimeDelta) -> String {
    #[allow(clippy::cast_precision_loss)]
    let ms = d.num_milliseconds() as f64;
    let hours = ms / 3_600_000.0;
    if hours < 1.0 {
        format!("{:.0} minutes", ms / 60_000.0)
    } else {
        format!("{hours:.1} hours")
    }
}

/// Duration between two server timestamps, formatted with [`format_duration`].
pub fn duration_between(start: &str, end: &str) -> Option<String> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Some(format_duration(end - start))
}

/// Start and end instants of a booking request, as sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWindow {
    pub start_time: String,
    pub end_time: String,
}

/// Which half of a booking request could not be turned into an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    Start,
    Duration,
}

/// Turn a `datetime-local` style start (`YYYY-MM-DDTHH:MM`, wall clock in
/// `tz`) and a fractional hour count into UTC ISO-8601 instants with
/// millisecond precision.
pub fn booking_window_in<Tz: TimeZone>(
    tz: &Tz,
    start_local: &str,
    duration_hours: f64,
) -> Result<BookingWindow, WindowError> {
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        return Err(WindowError::Duration);
    }
    let start = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(start_local.trim(), f).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or(WindowError::Start)?
        .with_timezone(&Utc);
    // The cast saturates; the checked add rejects what chrono can't hold.
    #[allow(clippy::cast_possible_truncation)]
    let millis = (duration_hours * 3_600_000.0).round() as i64;
    let end = TimeDelta::try_milliseconds(millis)
        .and_then(|span| start.checked_add_signed(span))
        .ok_or(WindowError::Duration)?;
    Ok(BookingWindow {
        start_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end_time: end.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Today's local date as `YYYY-MM-DD`, the default for slot queries.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
