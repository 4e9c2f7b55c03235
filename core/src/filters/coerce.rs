//! Value coercion
//!
//! Best-effort conversion of raw query strings into typed values. None of
//! these functions fail: a string that fits no candidate type stays a string.

use chrono::{NaiveDate, NaiveDateTime};

use super::types::{ObjectId, TypedValue};

/// Accepted date/time layouts, tried in order; the first full match wins.
///
/// The order is part of the public contract. `MonthYear` is `MM/YYYY` and
/// resolves to the first day of the month at midnight.
const DATETIME_LAYOUTS: &[Layout] = &[
    Layout::MonthYear,
    Layout::Date("%Y-%m-%d"),
    Layout::Date("%d-%m-%Y"),
    Layout::Date("%d/%m/%Y"),
    Layout::DateTime("%Y-%m-%d %H:%M"),
    Layout::DateTime("%d-%m-%Y %H:%M:%S"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    Layout::DateTime("%d/%m/%Y %H:%M:%S"),
    Layout::DateTime("%d/%m/%Y %H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%dT%H:%M:%S"),
    Layout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
];

enum Layout {
    MonthYear,
    Date(&'static str),
    DateTime(&'static str),
}

impl Layout {
    fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        if !self.has_four_digit_year(s) {
            return None;
        }
        match self {
            Self::MonthYear => NaiveDate::parse_from_str(&format!("01/{}", s), "%d/%m/%Y")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt).ok(),
        }
    }

    /// chrono's `%Y` takes any digit count; the year token must be exactly four
    fn has_four_digit_year(&self, s: &str) -> bool {
        let date = s.split([' ', 'T']).next().unwrap_or_default();
        let mut segments = date.split(['-', '/']);
        let year = match self {
            Self::Date(fmt) | Self::DateTime(fmt) if fmt.starts_with("%Y") => segments.next(),
            _ => segments.last(),
        };
        year.is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Whole-string base-10 integer
pub fn try_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// Whole-string floating point number
pub fn try_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// First layout in [`DATETIME_LAYOUTS`] that matches the whole string
pub fn try_datetime(s: &str) -> Option<NaiveDateTime> {
    // MonthYear prepends a day, so a bare "MM/YYYY" is the only shape it accepts
    if s.is_empty() {
        return None;
    }
    DATETIME_LAYOUTS.iter().find_map(|layout| layout.parse(s))
}

pub fn try_object_id(s: &str) -> Option<ObjectId> {
    ObjectId::parse_str(s)
}

/// Coercion used by the comparison family: datetime, then number, then string.
///
/// Datetimes go first so date fragments are never read as numbers. Integral
/// numbers stay integers; everything else numeric becomes a float.
pub fn coerce_comparable(raw: &str) -> TypedValue {
    if let Some(dt) = try_datetime(raw) {
        return TypedValue::DateTime(dt);
    }
    if let Some(i) = try_int(raw) {
        return TypedValue::Int(i);
    }
    if let Some(x) = try_float(raw) {
        return TypedValue::Float(x);
    }
    tracing::trace!(value = raw, "No typed coercion matched, using raw string");
    TypedValue::String(raw.to_string())
}

/// Coercion used for membership elements: integer when possible, else string
pub fn coerce_member(raw: &str) -> TypedValue {
    match try_int(raw) {
        Some(i) => TypedValue::Int(i),
        None => TypedValue::String(raw.to_string()),
    }
}

/// Split on a literal comma, no escaping, order preserved
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',')
}

/// `"false"` in any case is false, everything else is true
pub fn parse_flag(raw: &str) -> bool {
    !raw.eq_ignore_ascii_case("false")
}
