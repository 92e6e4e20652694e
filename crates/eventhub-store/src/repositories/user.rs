//! User repository. Users are provisioned outside the API; the service only
//! needs existence checks, and `insert` exists for seeding.

use rusqlite::{Connection, OptionalExtension, params};

use crate::errors::Result;
use crate::row_types::UserRow;

/// User repository.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user with an explicit ID.
    pub fn insert(conn: &Connection, id: i64, name: &str, email: &str) -> Result<UserRow> {
        let _ = conn.execute(
            "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3)",
            params![id, name, email],
        )?;
        Ok(UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    /// Whether a user with this ID exists.
    pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub(crate) fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
        })
    }
}
