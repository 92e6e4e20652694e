//! `SQLite` connection pool with WAL mode and foreign keys enabled.
//!
//! Uses `r2d2` connection pooling with `r2d2_sqlite` backend.
//! The [`PragmaCustomizer`] runs on each new connection to ensure
//! WAL mode, foreign keys, and the busy timeout are set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::{Result, StoreError};

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 16).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
    /// How long `get()` waits for a free connection (default: 5s).
    pub connection_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            busy_timeout_ms: 5_000,
            connection_timeout: Duration::from_secs(5),
        }
    }
}

/// Where the database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A private in-memory database.
    Memory,
    /// A database file.
    File(PathBuf),
}

impl ConnectionTarget {
    /// Parse a connection string.
    ///
    /// Accepts a bare path, `sqlite://path`, `sqlite:path`, `:memory:` and
    /// `sqlite::memory:`. Query strings (`?mode=rwc`) are ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        let rest = rest.split('?').next().unwrap_or_default();

        if rest.is_empty() {
            return Err(StoreError::InvalidTarget(url.to_string()));
        }
        if rest == ":memory:" {
            return Ok(Self::Memory);
        }
        if rest.contains("://") {
            return Err(StoreError::InvalidTarget(url.to_string()));
        }
        Ok(Self::File(PathBuf::from(rest)))
    }
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, ":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// `SQLite` pragma customizer that runs on each new connection.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;\
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))?;
        Ok(())
    }
}

/// Open a pool for the given target.
pub fn open(target: &ConnectionTarget, config: &ConnectionConfig) -> Result<ConnectionPool> {
    match target {
        ConnectionTarget::Memory => new_in_memory(config),
        ConnectionTarget::File(path) => new_file(path, config),
    }
}

/// Create an in-memory connection pool.
///
/// Every `SQLite` in-memory connection is its own database, so the pool is
/// capped at one connection regardless of `pool_size`, and that connection
/// is never recycled.
pub fn new_in_memory(config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pool = builder(1, config)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(SqliteConnectionManager::memory())?;
    Ok(pool)
}

/// Create a file-backed connection pool, creating parent directories.
pub fn new_file(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let pool = builder(config.pool_size, config).build(SqliteConnectionManager::file(path))?;
    Ok(pool)
}

fn builder(max_size: u32, config: &ConnectionConfig) -> r2d2::Builder<SqliteConnectionManager> {
    Pool::builder()
        .max_size(max_size)
        .connection_timeout(config.connection_timeout)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    struct PragmaState {
        journal_mode: String,
        foreign_keys_enabled: bool,
    }

    fn verify_pragmas(conn: &Connection) -> PragmaState {
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        PragmaState {
            journal_mode,
            foreign_keys_enabled: foreign_keys == 1,
        }
    }

    #[test]
    fn parse_targets() {
        assert_eq!(ConnectionTarget::parse(":memory:").unwrap(), ConnectionTarget::Memory);
        assert_eq!(
            ConnectionTarget::parse("sqlite::memory:").unwrap(),
            ConnectionTarget::Memory
        );
        assert_eq!(
            ConnectionTarget::parse("sqlite://data/events.db?mode=rwc").unwrap(),
            ConnectionTarget::File(PathBuf::from("data/events.db"))
        );
        assert_eq!(
            ConnectionTarget::parse("sqlite:events.db").unwrap(),
            ConnectionTarget::File(PathBuf::from("events.db"))
        );
        assert_eq!(
            ConnectionTarget::parse("/var/lib/eventhub.db").unwrap(),
            ConnectionTarget::File(PathBuf::from("/var/lib/eventhub.db"))
        );
    }

    #[test]
    fn parse_rejects_other_schemes() {
        assert_matches!(
            ConnectionTarget::parse("postgres://localhost/events"),
            Err(StoreError::InvalidTarget(_))
        );
        assert_matches!(ConnectionTarget::parse("  "), Err(StoreError::InvalidTarget(_)));
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let config = ConnectionConfig::default();
        let pool = new_in_memory(&config).unwrap();
        assert_eq!(pool.max_size(), 1);
        let conn = pool.get().unwrap();
        let pragmas = verify_pragmas(&conn);
        assert_eq!(pragmas.journal_mode, "memory");
        assert!(pragmas.foreign_keys_enabled);
    }

    #[test]
    fn file_pool_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("eventhub.db");
        let pool = new_file(&path, &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let pragmas = verify_pragmas(&conn);
        assert_eq!(pragmas.journal_mode, "wal");
        assert!(pragmas.foreign_keys_enabled);
        assert!(path.exists());
    }

    #[test]
    fn file_pool_respects_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConnectionConfig {
            pool_size: 4,
            ..Default::default()
        };
        let pool = new_file(&dir.path().join("t.db"), &config).unwrap();
        assert_eq!(pool.max_size(), 4);
        let conns: Vec<_> = (0..4).map(|_| pool.get().unwrap()).collect();
        assert_eq!(conns.len(), 4);
    }
}
