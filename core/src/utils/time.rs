//! Time utility functions

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Timelike};

use crate::filters::coerce::try_datetime;

/// Format a naive (UTC) datetime as ISO 8601 with millisecond precision
pub fn datetime_to_iso(dt: &NaiveDateTime) -> String {
    dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Round up to the next whole millisecond
///
/// Stores that keep millisecond timestamps need this for strict upper and
/// inclusive lower bounds, where truncation would move the boundary.
pub fn ceil_to_millis(dt: &NaiveDateTime) -> NaiveDateTime {
    let sub_millis = dt.nanosecond() % 1_000_000;
    if sub_millis == 0 {
        *dt
    } else {
        *dt + TimeDelta::nanoseconds(i64::from(1_000_000 - sub_millis))
    }
}

/// Parse a timestamp stored in a document
///
/// Accepts RFC 3339 (converted to UTC) and every layout understood by
/// query-value coercion.
pub fn parse_document_timestamp(ts: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| try_datetime(ts))
}
