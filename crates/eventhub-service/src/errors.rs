//! Service error taxonomy.
//!
//! Each variant carries the client-facing message and maps to one HTTP
//! status. Store failures are the only variant whose detail is withheld
//! from clients.

use eventhub_store::StoreError;
use thiserror::Error;

/// Generic message returned to clients for internal failures.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Errors returned by [`EventService`](crate::EventService) operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range request data.
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced event or user does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Cancellation of a registration that does not exist.
    #[error("User is not registered for this event")]
    NotRegistered,

    /// Duplicate registration.
    #[error("{0}")]
    Conflict(String),

    /// Registration attempted while the event is full.
    #[error("Event capacity is full")]
    CapacityExceeded,

    /// Underlying data-store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::NotRegistered | Self::CapacityExceeded => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Store(_) => 500,
        }
    }

    /// Message safe to show to clients.
    pub fn client_message(&self) -> String {
        match self {
            Self::Store(_) => SERVER_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this is an internal failure rather than a client mistake.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub(crate) fn invalid(message: &str) -> Self {
        Self::InvalidInput(message.to_string())
    }

    pub(crate) fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }
}

/// Convenience type alias for service results.
pub type Result<T> = std::result::Result<T, ServiceError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
