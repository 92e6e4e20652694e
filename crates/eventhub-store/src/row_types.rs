//! Database row types for mapping between `SQLite` rows and Rust structs.
//!
//! These are the raw row shapes. Timestamps stay as stored text here and
//! are decoded on demand with [`parse_timestamp`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StoreError};

/// Raw event row from the `events` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    /// Event ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Start time as RFC 3339 UTC text.
    pub datetime: String,
    /// Location.
    pub location: String,
    /// Maximum number of registrations.
    pub capacity: i64,
}

impl EventRow {
    /// Decode the stored start time.
    pub fn starts_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp("events", "datetime", &self.datetime)
    }
}

/// Fields for a new `events` row. The ID is assigned by the database.
#[derive(Clone, Debug)]
pub struct NewEventRow<'a> {
    /// Title.
    pub title: &'a str,
    /// Start time.
    pub datetime: DateTime<Utc>,
    /// Location.
    pub location: &'a str,
    /// Capacity.
    pub capacity: i64,
}

/// Raw user row from the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Format a timestamp the way it is stored: RFC 3339, UTC, millisecond
/// precision, `Z` suffix. Fixed width keeps text ordering chronological.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp.
pub fn parse_timestamp(
    table: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidRow {
            table,
            column,
            detail: e.to_string(),
        })
}
