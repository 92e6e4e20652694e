//! Input validation for event creation and registration IDs.
//!
//! Everything here is pure. Request bodies arrive as loosely typed JSON so a
//! wrong type yields the documented validation message instead of a
//! deserialization error.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::errors::{Result, ServiceError};
use crate::types::CreateEventRequest;

/// Smallest accepted capacity.
pub const MIN_CAPACITY: i64 = 1;

/// Largest accepted capacity.
pub const MAX_CAPACITY: i64 = 1000;

const TITLE_REQUIRED: &str = "Title is required";
const INVALID_DATETIME: &str = "Invalid ISO date/time";
const LOCATION_REQUIRED: &str = "Location is required";
const INVALID_CAPACITY: &str = "Capacity must be 1-1000";

/// A validated event, ready to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEvent {
    /// Trimmed title.
    pub title: String,
    /// Start time in UTC.
    pub datetime: DateTime<Utc>,
    /// Trimmed location.
    pub location: String,
    /// Capacity in `[1, 1000]`.
    pub capacity: i64,
}

/// Validate an event-creation request. Rules run in order and the first
/// failure wins: title, datetime, location, capacity.
pub fn validate_event(req: &CreateEventRequest) -> Result<NewEvent> {
    let title = non_blank(req.title.as_ref()).ok_or_else(|| ServiceError::invalid(TITLE_REQUIRED))?;

    let datetime = req
        .datetime
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_datetime)
        .ok_or_else(|| ServiceError::invalid(INVALID_DATETIME))?;

    let location =
        non_blank(req.location.as_ref()).ok_or_else(|| ServiceError::invalid(LOCATION_REQUIRED))?;

    let capacity = req
        .capacity
        .as_ref()
        .and_then(integral)
        .filter(|c| (MIN_CAPACITY..=MAX_CAPACITY).contains(c))
        .ok_or_else(|| ServiceError::invalid(INVALID_CAPACITY))?;

    Ok(NewEvent {
        title: title.to_string(),
        datetime,
        location: location.to_string(),
        capacity,
    })
}

/// Years that store as four digits, keeping stored text ordered.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse a calendar date/time.
///
/// Accepts RFC 3339 with an offset, naive ISO date-times (`T` or space
/// separator, seconds and fractions optional) read as UTC, and bare
/// `YYYY-MM-DD` dates read as UTC midnight. The UTC year must fall in
/// `0000..=9999`.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    parse_any_datetime(raw).filter(|dt| YEAR_RANGE.contains(&dt.year()))
}

fn parse_any_datetime(raw: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%MZ"];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse an ID taken from a URL path segment.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Parse an ID supplied in a JSON body: an integral number or a numeric
/// string.
pub fn parse_id_value(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::String(s) => parse_id(s),
        other => integral(other),
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// An integer-valued JSON number. `5.0` counts, `5.5` does not.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
