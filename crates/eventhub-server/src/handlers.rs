//! Route handlers. Each one forwards path parameters and the JSON body to
//! the matching [`EventService`](eventhub_service::EventService) operation.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use eventhub_service::{
    CreateEventRequest, CreatedEvent, EventDetails, EventStats, EventView, MessageResponse,
    RegistrationRequest,
};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::LenientJson;
use crate::health;
use crate::server::AppState;

/// Root banner text.
pub const BANNER: &str = "Event Management API is running";

type ApiResult<T> = Result<T, ApiError>;

/// GET /
pub async fn root() -> &'static str {
    BANNER
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db = state.service.database().clone();
    let database_up = match tokio::task::spawn_blocking(move || db.ping()).await {
        Ok(up) => up,
        Err(e) => {
            warn!(error = %e, "health probe task failed");
            false
        }
    };
    let resp = health::health_check(state.start_time, database_up);
    let status = if resp.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(resp))
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<CreatedEvent>)> {
    let created = state.service.create_event(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /events/upcoming
pub async fn list_upcoming_events(State(state): State<AppState>) -> ApiResult<Json<Vec<EventView>>> {
    Ok(Json(state.service.list_upcoming_events().await?))
}

/// GET /events/{id}
pub async fn get_event_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventDetails>> {
    Ok(Json(state.service.get_event_details(&id).await?))
}

/// POST /events/{id}/register
pub async fn register_for_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    LenientJson(req): LenientJson<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let resp = state.service.register_for_event(&id, req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// DELETE /events/{id}/cancel
pub async fn cancel_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    LenientJson(req): LenientJson<RegistrationRequest>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.service.cancel_registration(&id, req).await?))
}

/// GET /events/{id}/stats
pub async fn get_event_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventStats>> {
    Ok(Json(state.service.get_event_stats(&id).await?))
}
