//! # eventhub-service
//!
//! Event management operations on top of `eventhub-store`:
//!
//! - **Validator**: pure checks turning a loosely typed request into a [`NewEvent`]
//! - **[`EventService`]**: create, details, register, cancel, upcoming, stats
//! - **[`ServiceError`]**: error taxonomy with HTTP status and client message
//!
//! The service keeps no state between requests beyond the shared database
//! handle.

#![deny(unsafe_code)]

pub mod errors;
pub mod service;
pub mod types;
pub mod validator;

pub use errors::{Result, SERVER_ERROR_MESSAGE, ServiceError};
pub use service::{EventService, compute_stats};
pub use types::{
    CreateEventRequest, CreatedEvent, EventDetails, EventStats, EventView, MessageResponse,
    Registrant, RegistrationRequest,
};
pub use validator::{NewEvent, parse_datetime, parse_id, validate_event};
