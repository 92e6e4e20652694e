//! Error types for the storage layer.
//!
//! [`StoreError`] is returned by every pool, migration and repository
//! operation. Callers above the store treat all of it as an internal
//! failure; only [`StoreError::is_primary_key_violation`] is inspected.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// A stored value could not be decoded.
    #[error("invalid value in {table}.{column}: {detail}")]
    InvalidRow {
        /// Table the row came from.
        table: &'static str,
        /// Offending column.
        column: &'static str,
        /// Decoder message.
        detail: String,
    },

    /// The connection string is not a supported `SQLite` location.
    #[error("unsupported database url: {0}")]
    InvalidTarget(String),

    /// Internal error (e.g. a panicked blocking task).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether the error came from a duplicate primary key. Foreign key,
    /// `CHECK` and other constraint failures do not count.
    pub fn is_primary_key_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
