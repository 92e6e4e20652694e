//! [`Database`]: the process-wide handle to the connection pool.
//!
//! Opened once at startup and cloned into whatever needs it. Cloning is
//! cheap; the underlying `r2d2` pool is reference counted.

use tracing::{debug, info};

use crate::connection::{self, ConnectionConfig, ConnectionPool, ConnectionTarget, PooledConnection};
use crate::errors::Result;
use crate::migrations;

/// Shared database handle.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
    target: ConnectionTarget,
}

impl Database {
    /// Open the database described by `url` and bring its schema up to date.
    pub fn open(url: &str, config: &ConnectionConfig) -> Result<Self> {
        let target = ConnectionTarget::parse(url)?;
        let pool = connection::open(&target, config)?;
        let db = Self { pool, target };
        let applied = db.migrate()?;
        info!(location = %db.target, applied, pool_size = db.pool.max_size(), "database ready");
        Ok(db)
    }

    /// Open a private in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:", &ConnectionConfig::default())
    }

    /// Where this database lives.
    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    /// Check out a connection, waiting up to the configured timeout.
    pub fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Apply pending migrations. Returns how many ran.
    pub fn migrate(&self) -> Result<u32> {
        let conn = self.conn()?;
        migrations::run_migrations(&conn)
    }

    /// Round-trip to the database and return its clock reading.
    pub fn server_time(&self) -> Result<String> {
        let conn = self.conn()?;
        let now: String = conn.query_row("SELECT datetime('now')", [], |row| row.get(0))?;
        debug!(%now, "database clock");
        Ok(now)
    }

    /// Whether the database answers a trivial query.
    pub fn ping(&self) -> bool {
        let Ok(conn) = self.conn() else {
            return false;
        };
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("target", &self.target)
            .field("max_size", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}
