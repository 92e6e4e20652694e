//! Registration repository: the `(user_id, event_id)` link table.
//!
//! The composite primary key rejects duplicate pairs. Capacity is not a
//! database constraint; callers compare [`RegistrationRepo::count_for_event`]
//! against the event's capacity before inserting.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::repositories::user::UserRepo;
use crate::row_types::UserRow;

/// Registration repository.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Whether `user_id` is registered for `event_id`.
    pub fn exists(conn: &Connection, user_id: i64, event_id: i64) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM registrations WHERE user_id = ?1 AND event_id = ?2",
                params![user_id, event_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Number of live registrations for an event.
    pub fn count_for_event(conn: &Connection, event_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM registrations WHERE event_id = ?1",
            params![event_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert a registration.
    pub fn insert(conn: &Connection, user_id: i64, event_id: i64) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO registrations (user_id, event_id) VALUES (?1, ?2)",
            params![user_id, event_id],
        )?;
        Ok(())
    }

    /// Delete a registration. Returns whether a row was removed.
    pub fn delete(conn: &Connection, user_id: i64, event_id: i64) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM registrations WHERE user_id = ?1 AND event_id = ?2",
            params![user_id, event_id],
        )?;
        Ok(changed > 0)
    }

    /// Users registered for an event, in registration order.
    pub fn registrants(conn: &Connection, event_id: i64) -> Result<Vec<UserRow>> {
        let mut stmt = conn.prepare(
            "SELECT u.id, u.name, u.email
             FROM registrations r
             JOIN users u ON u.id = r.user_id
             WHERE r.event_id = ?1
             ORDER BY r.rowid ASC",
        )?;
        let rows = stmt
            .query_map(params![event_id], UserRepo::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
