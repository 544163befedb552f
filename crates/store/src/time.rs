//! Timestamp parsing and hour truncation.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

/// Parse an ISO-8601 timestamp with a trailing `Z` or an explicit offset.
///
/// Seconds are optional, so both `2024-01-01T12:00:00+01:00` and
/// `2024-01-01T12:00Z` are accepted. Returns `None` for anything else,
/// including timestamps without an offset.
pub fn parse_time(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    let normalised = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };
    DateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M%:z")
        .or_else(|_| DateTime::parse_from_str(&normalised, "%Y-%m-%dT%H:%M:%S%.f%:z"))
        .ok()
}

/// Truncate a timestamp to the start of its hour in its own offset and
/// convert it to UTC.
///
/// Truncating before converting matters for offsets that are not whole hours.
pub fn truncate_to_hour(dt: DateTime<FixedOffset>) -> DateTime<Utc> {
    let truncated = dt
        .with_nanosecond(0)
        .and_then(|d| d.with_second(0))
        .and_then(|d| d.with_minute(0))
        .unwrap_or(dt);
    truncated.with_timezone(&Utc)
}

/// Parse and hour-truncate in one step.
pub fn parse_hour(s: &str) -> Option<DateTime<Utc>> {
    parse_time(s).map(truncate_to_hour)
}

/// Build the UTC run time of a partition from its date and hour.
pub fn partition_time(date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(hour, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}
