//! Request and response shapes for the service operations.
//!
//! Requests keep their fields as raw JSON so validation, not
//! deserialization, decides what is acceptable. Responses serialize with
//! `camelCase` keys.

use chrono::{DateTime, Utc};
use eventhub_store::{EventRow, UserRow, format_timestamp};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::errors::Result;

/// Body of `POST /events`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEventRequest {
    /// Event title.
    pub title: Option<Value>,
    /// Start time.
    pub datetime: Option<Value>,
    /// Location.
    pub location: Option<Value>,
    /// Capacity.
    pub capacity: Option<Value>,
}

/// Body of the register and cancel endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationRequest {
    /// User to register or cancel.
    pub user_id: Option<Value>,
}

impl RegistrationRequest {
    /// Request for a numeric user ID.
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(Value::from(user_id)),
        }
    }
}

/// Response of a successful event creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    /// Generated event ID.
    pub event_id: i64,
}

/// Response carrying a human-readable confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Confirmation text.
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// An event as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// Event ID.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Start time.
    #[serde(serialize_with = "serialize_timestamp")]
    pub datetime: DateTime<Utc>,
    /// Location.
    pub location: String,
    /// Capacity.
    pub capacity: i64,
}

impl TryFrom<EventRow> for EventView {
    type Error = crate::errors::ServiceError;

    fn try_from(row: EventRow) -> Result<Self> {
        let datetime = row.starts_at()?;
        Ok(Self {
            id: row.id,
            title: row.title,
            datetime,
            location: row.location,
            capacity: row.capacity,
        })
    }
}

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registrant {
    /// User ID.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Email.
    pub email: String,
}

impl From<UserRow> for Registrant {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

/// An event with its registrants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    /// Event fields, flattened into the top level.
    #[serde(flatten)]
    pub event: EventView,
    /// Registered users.
    pub registrations: Vec<Registrant>,
}

/// Registration statistics for one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Live registrations.
    pub total_registrations: i64,
    /// `capacity - total_registrations`; negative if oversold.
    pub remaining_capacity: i64,
    /// Share of capacity used, two decimals and a `%` suffix.
    pub percentage_used: String,
}

fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}
