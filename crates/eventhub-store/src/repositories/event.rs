//! Event repository. Events are insert-only.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::row_types::{EventRow, NewEventRow, format_timestamp};

/// Event repository.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event and return it with its generated ID.
    pub fn insert(conn: &Connection, new: &NewEventRow<'_>) -> Result<EventRow> {
        let datetime = format_timestamp(&new.datetime);
        let _ = conn.execute(
            "INSERT INTO events (title, datetime, location, capacity) VALUES (?1, ?2, ?3, ?4)",
            params![new.title, datetime, new.location, new.capacity],
        )?;
        Ok(EventRow {
            id: conn.last_insert_rowid(),
            title: new.title.to_string(),
            datetime,
            location: new.location.to_string(),
            capacity: new.capacity,
        })
    }

    /// Get an event by ID.
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<EventRow>> {
        let row = conn
            .query_row(
                "SELECT id, title, datetime, location, capacity FROM events WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Events starting strictly after `now`, earliest first, ties broken by
    /// location.
    pub fn list_upcoming(conn: &Connection, now: &DateTime<Utc>) -> Result<Vec<EventRow>> {
        let mut stmt = conn.prepare(
            "SELECT id, title, datetime, location, capacity FROM events
             WHERE datetime > ?1
             ORDER BY datetime ASC, location ASC",
        )?;
        let rows = stmt
            .query_map(params![format_timestamp(now)], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
        Ok(EventRow {
            id: row.get("id")?,
            title: row.get("title")?,
            datetime: row.get("datetime")?,
            location: row.get("location")?,
            capacity: row.get("capacity")?,
        })
    }
}
