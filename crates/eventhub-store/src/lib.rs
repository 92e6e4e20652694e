//! # eventhub-store
//!
//! `SQLite` storage for events, users and registrations.
//!
//! - **Connection**: `r2d2` pool with per-connection pragmas (WAL, foreign keys, busy timeout)
//! - **Migrations**: version-tracked schema embedded in the binary
//! - **Repositories**: stateless query helpers taking `&Connection`
//! - **[`Database`]**: the shared pool handle opened once at startup
//!
//! Everything here is synchronous. Async callers run store work on the
//! blocking thread pool.

#![deny(unsafe_code)]

pub mod connection;
pub mod database;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;

pub use connection::{ConnectionConfig, ConnectionPool, ConnectionTarget, PooledConnection};
pub use database::Database;
pub use errors::{Result, StoreError};
pub use repositories::event::EventRepo;
pub use repositories::registration::RegistrationRepo;
pub use repositories::user::UserRepo;
pub use rusqlite::Connection;
pub use row_types::{EventRow, NewEventRow, UserRow, format_timestamp, parse_timestamp};
