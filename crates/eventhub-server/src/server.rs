//! `EventhubServer`: router assembly and the serve loop.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{delete, get, post};
use eventhub_service::EventService;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers;
use crate::shutdown::ShutdownCoordinator;

/// Shared state accessible from Axum handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Event operations over the shared database.
    pub service: EventService,
    /// When the server started.
    pub start_time: Instant,
}

/// The eventhub HTTP server.
pub struct EventhubServer {
    config: ServerConfig,
    service: EventService,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl EventhubServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, service: EventService) -> Self {
        Self {
            config,
            service,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        build_router(AppState {
            service: self.service.clone(),
            start_time: self.start_time,
        })
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config.bind_addr()).await
    }

    /// Serve on `listener` until shutdown is requested, then drain in-flight
    /// requests for at most the configured timeout.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        let token = self.shutdown.token();
        let drain_timeout = self.config.shutdown_timeout();
        let server = axum::serve(listener, self.router())
            .with_graceful_shutdown(token.clone().cancelled_owned());

        info!(%addr, "eventhub server listening");
        let mut handle = tokio::spawn(async move { server.await });

        tokio::select! {
            result = &mut handle => return result.map_err(std::io::Error::other)?,
            () = token.cancelled() => {}
        }

        info!(timeout_secs = drain_timeout.as_secs(), "draining connections");
        if let Ok(result) = tokio::time::timeout(drain_timeout, &mut handle).await {
            result.map_err(std::io::Error::other)?
        } else {
            warn!("shutdown timed out after {drain_timeout:?}, aborting open connections");
            handle.abort();
            Ok(())
        }
    }
}

/// Build the router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_handler))
        .route("/events", post(handlers::create_event))
        .route("/events/upcoming", get(handlers::list_upcoming_events))
        .route("/events/{id}", get(handlers::get_event_details))
        .route("/events/{id}/register", post(handlers::register_for_event))
        .route("/events/{id}/cancel", delete(handlers::cancel_registration))
        .route("/events/{id}/stats", get(handlers::get_event_stats))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
