//! # eventhub-server
//!
//! Axum HTTP server for the event management API.
//!
//! - Event routes under `/events` mapped onto [`EventService`](eventhub_service::EventService)
//! - `{"error": ...}` responses via [`ApiError`]
//! - `/` banner and `/health` probe
//! - Permissive CORS and request tracing on every route
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use server::{AppState, EventhubServer, build_router};
pub use shutdown::ShutdownCoordinator;
