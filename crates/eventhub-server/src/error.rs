//! HTTP error responses.
//!
//! Every failure is rendered as `{"error": "..."}` with the status the
//! service assigns. Internal failures are logged here and reach the client
//! only as `"Server error"`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eventhub_service::ServiceError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Client-facing message.
    pub error: String,
}

/// Handler error wrapping a [`ServiceError`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_internal() {
            error!(error = %self.0, status = status.as_u16(), "request failed");
        }
        let body = ErrorBody {
            error: self.0.client_message(),
        };
        (status, Json(body)).into_response()
    }
}
