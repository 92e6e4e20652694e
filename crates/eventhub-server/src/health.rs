//! `/health` endpoint.

use std::time::Instant;

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` when the database answers, `"degraded"` otherwise.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// `"up"` or `"down"`.
    pub database: String,
}

impl HealthResponse {
    /// Whether every dependency is reachable.
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Build a health response.
pub fn health_check(start_time: Instant, database_up: bool) -> HealthResponse {
    HealthResponse {
        status: if database_up { "ok" } else { "degraded" }.into(),
        uptime_secs: start_time.elapsed().as_secs(),
        database: if database_up { "up" } else { "down" }.into(),
    }
}
