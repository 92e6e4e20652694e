//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`,
//! so every operation is a plain function of (connection, input) and can be
//! tested against a fresh in-memory database.

pub mod event;
pub mod registration;
pub mod user;
