//! [`EventService`]: the six event operations.
//!
//! Every operation is a straight sequence of store calls on one pooled
//! connection, run on the blocking thread pool. Nothing wraps the sequence
//! in a transaction, so registration is check-then-act: concurrent requests
//! for the last seat can both pass the capacity check and both insert.

use chrono::Utc;
use eventhub_store::{
    Connection, Database, EventRepo, NewEventRow, RegistrationRepo, StoreError, UserRepo,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::{Result, ServiceError};
use crate::types::{
    CreateEventRequest, CreatedEvent, EventDetails, EventStats, EventView, MessageResponse,
    Registrant, RegistrationRequest,
};
use crate::validator::{parse_id, parse_id_value, validate_event};

const INVALID_EVENT_ID: &str = "Invalid event ID";
const INVALID_IDS: &str = "Invalid event ID or user ID";
const EVENT_NOT_FOUND: &str = "Event not found";
const USER_NOT_FOUND: &str = "User not found";
const PAST_EVENT: &str = "Cannot register for past events";
const ALREADY_REGISTERED: &str = "User already registered";
const REGISTERED: &str = "User registered successfully";
const CANCELLED: &str = "Registration cancelled";

/// Event operations over a shared [`Database`].
#[derive(Clone, Debug)]
pub struct EventService {
    db: Database,
}

impl EventService {
    /// Create a service over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The database this service uses.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validate and insert a new event.
    #[instrument(skip_all, fields(op = "create_event"))]
    pub async fn create_event(&self, req: CreateEventRequest) -> Result<CreatedEvent> {
        let event = validate_event(&req)?;
        let row = self
            .with_conn(move |conn| {
                Ok(EventRepo::insert(
                    conn,
                    &NewEventRow {
                        title: &event.title,
                        datetime: event.datetime,
                        location: &event.location,
                        capacity: event.capacity,
                    },
                )?)
            })
            .await?;
        info!(event_id = row.id, title = %row.title, capacity = row.capacity, "event created");
        Ok(CreatedEvent { event_id: row.id })
    }

    /// An event and the users registered for it.
    #[instrument(skip(self), fields(op = "get_event_details"))]
    pub async fn get_event_details(&self, event_id: &str) -> Result<EventDetails> {
        let event_id = parse_id(event_id).ok_or_else(|| ServiceError::invalid(INVALID_EVENT_ID))?;
        let (event, users) = self
            .with_conn(move |conn| {
                let event = EventRepo::get_by_id(conn, event_id)?
                    .ok_or_else(|| ServiceError::not_found(EVENT_NOT_FOUND))?;
                let users = RegistrationRepo::registrants(conn, event_id)?;
                Ok((event, users))
            })
            .await?;
        Ok(EventDetails {
            event: EventView::try_from(event)?,
            registrations: users.into_iter().map(Registrant::from).collect(),
        })
    }

    /// Register a user for an upcoming event with free capacity.
    #[instrument(skip(self, req), fields(op = "register_for_event"))]
    pub async fn register_for_event(
        &self,
        event_id: &str,
        req: RegistrationRequest,
    ) -> Result<MessageResponse> {
        let (event_id, user_id) = parse_ids(event_id, &req)?;
        self.with_conn(move |conn| {
            let event = EventRepo::get_by_id(conn, event_id)?
                .ok_or_else(|| ServiceError::not_found(EVENT_NOT_FOUND))?;
            if event.starts_at()? < Utc::now() {
                return Err(ServiceError::invalid(PAST_EVENT));
            }
            if !UserRepo::exists(conn, user_id)? {
                return Err(ServiceError::not_found(USER_NOT_FOUND));
            }
            if RegistrationRepo::exists(conn, user_id, event_id)? {
                return Err(ServiceError::Conflict(ALREADY_REGISTERED.to_string()));
            }
            let count = RegistrationRepo::count_for_event(conn, event_id)?;
            if count >= event.capacity {
                debug!(event_id, count, capacity = event.capacity, "event full");
                return Err(ServiceError::CapacityExceeded);
            }
            insert_registration(conn, user_id, event_id)
        })
        .await?;
        info!(event_id, user_id, "user registered");
        Ok(MessageResponse::new(REGISTERED))
    }

    /// Remove an existing registration.
    #[instrument(skip(self, req), fields(op = "cancel_registration"))]
    pub async fn cancel_registration(
        &self,
        event_id: &str,
        req: RegistrationRequest,
    ) -> Result<MessageResponse> {
        let (event_id, user_id) = parse_ids(event_id, &req)?;
        self.with_conn(move |conn| {
            if !RegistrationRepo::exists(conn, user_id, event_id)? {
                return Err(ServiceError::NotRegistered);
            }
            let _ = RegistrationRepo::delete(conn, user_id, event_id)?;
            Ok(())
        })
        .await?;
        info!(event_id, user_id, "registration cancelled");
        Ok(MessageResponse::new(CANCELLED))
    }

    /// Events starting after now, earliest first, ties by location.
    #[instrument(skip(self), fields(op = "list_upcoming_events"))]
    pub async fn list_upcoming_events(&self) -> Result<Vec<EventView>> {
        let now = Utc::now();
        let rows = self
            .with_conn(move |conn| Ok(EventRepo::list_upcoming(conn, &now)?))
            .await?;
        debug!(count = rows.len(), "upcoming events");
        rows.into_iter().map(EventView::try_from).collect()
    }

    /// Registration totals for an event.
    #[instrument(skip(self), fields(op = "get_event_stats"))]
    pub async fn get_event_stats(&self, event_id: &str) -> Result<EventStats> {
        let event_id = parse_id(event_id).ok_or_else(|| ServiceError::invalid(INVALID_EVENT_ID))?;
        let (capacity, total) = self
            .with_conn(move |conn| {
                let event = EventRepo::get_by_id(conn, event_id)?
                    .ok_or_else(|| ServiceError::not_found(EVENT_NOT_FOUND))?;
                let total = RegistrationRepo::count_for_event(conn, event_id)?;
                Ok((event.capacity, total))
            })
            .await?;
        Ok(compute_stats(capacity, total))
    }

    /// Run `f` against a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.conn()?;
            f(&conn)
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "store task failed to complete");
            ServiceError::Store(StoreError::Internal(format!("store task failed: {e}")))
        })?
    }
}

/// Compute stats from a capacity and a live registration count.
///
/// `percentage_used` is rounded half away from zero to two decimals. A zero
/// capacity yields `"NaN%"` (or `"Infinity%"` with registrations) instead of
/// failing.
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(capacity: i64, total_registrations: i64) -> EventStats {
    let ratio = total_registrations as f64 / capacity as f64 * 100.0;
    EventStats {
        total_registrations,
        remaining_capacity: capacity - total_registrations,
        percentage_used: format_percentage(ratio),
    }
}

fn format_percentage(value: f64) -> String {
    if value.is_nan() {
        "NaN%".to_string()
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{sign}Infinity%")
    } else {
        format!("{:.2}%", (value * 100.0).round() / 100.0)
    }
}

fn parse_ids(event_id: &str, req: &RegistrationRequest) -> Result<(i64, i64)> {
    match (parse_id(event_id), parse_id_value(req.user_id.as_ref())) {
        (Some(event_id), Some(user_id)) => Ok((event_id, user_id)),
        _ => Err(ServiceError::invalid(INVALID_IDS)),
    }
}

/// Insert, mapping a lost duplicate race on the primary key to a conflict.
/// Any other constraint failure stays a store error.
fn insert_registration(conn: &Connection, user_id: i64, event_id: i64) -> Result<()> {
    match RegistrationRepo::insert(conn, user_id, event_id) {
        Ok(()) => Ok(()),
        Err(e) if e.is_primary_key_violation() => {
            warn!(event_id, user_id, error = %e, "registration insert hit the primary key");
            Err(ServiceError::Conflict(ALREADY_REGISTERED.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn service() -> EventService {
        let db = Database::open_in_memory().unwrap();
        {
            let conn = db.conn().unwrap();
            for (id, name) in [(1, "Ada"), (2, "Grace"), (3, "Linus")] {
                let _ = UserRepo::insert(&conn, id, name, &format!("{}@example.com", name.to_lowercase()))
                    .unwrap();
            }
        }
        EventService::new(db)
    }

    fn create_req(datetime: &str, location: &str, capacity: i64) -> CreateEventRequest {
        serde_json::from_value(json!({
            "title": "Conf",
            "datetime": datetime,
            "location": location,
            "capacity": capacity
        }))
        .unwrap()
    }

    async fn create(svc: &EventService, datetime: &str, capacity: i64) -> String {
        svc.create_event(create_req(datetime, "Hall", capacity))
            .await
            .unwrap()
            .event_id
            .to_string()
    }

    #[tokio::test]
    async fn end_to_end_capacity_one() {
        let svc = service();
        let id = create(&svc, "2099-01-01T00:00:00Z", 1).await;

        let ok = svc
            .register_for_event(&id, RegistrationRequest::for_user(1))
            .await
            .unwrap();
        assert_eq!(ok.message, "User registered successfully");

        assert_matches!(
            svc.register_for_event(&id, RegistrationRequest::for_user(2)).await,
            Err(ServiceError::CapacityExceeded)
        );

        let cancelled = svc
            .cancel_registration(&id, RegistrationRequest::for_user(1))
            .await
            .unwrap();
        assert_eq!(cancelled.message, "Registration cancelled");

        let stats = svc.get_event_stats(&id).await.unwrap();
        assert_eq!(stats.total_registrations, 0);
        assert_eq!(stats.remaining_capacity, 1);
        assert_eq!(stats.percentage_used, "0.00%");
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let svc = service();
        let err = svc
            .create_event(create_req("2099-01-01", "Hall", 0))
            .await
            .unwrap_err();
        assert_eq!(err.client_message(), "Capacity must be 1-1000");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_years() {
        let svc = service();
        for raw in ["+12345-01-01T00:00:00", "-0001-01-01"] {
            let err = svc
                .create_event(create_req(raw, "Hall", 5))
                .await
                .unwrap_err();
            assert_eq!(err.client_message(), "Invalid ISO date/time");
        }
        let id = create(&svc, "9999-12-31T23:59:59Z", 5).await;
        assert!(svc.get_event_details(&id).await.is_ok());
        let upcoming = svc.list_upcoming_events().await.unwrap();
        assert_eq!(upcoming.len(), 1);
    }

    #[tokio::test]
    async fn details_include_registrants() {
        let svc = service();
        let id = create(&svc, "2099-06-01T12:00:00Z", 5).await;
        for user in [2, 1] {
            let _ = svc
                .register_for_event(&id, RegistrationRequest::for_user(user))
                .await
                .unwrap();
        }

        let details = svc.get_event_details(&id).await.unwrap();
        assert_eq!(details.event.title, "Conf");
        assert_eq!(details.event.capacity, 5);
        let names: Vec<&str> = details.registrations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Grace", "Ada"]);
    }

    #[tokio::test]
    async fn details_errors() {
        let svc = service();
        assert_matches!(
            svc.get_event_details("abc").await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Invalid event ID"
        );
        assert_matches!(
            svc.get_event_details("999").await,
            Err(ServiceError::NotFound(msg)) if msg == "Event not found"
        );
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let svc = service();
        let id = create(&svc, "2099-01-01", 10).await;
        let _ = svc
            .register_for_event(&id, RegistrationRequest::for_user(3))
            .await
            .unwrap();
        let err = svc
            .register_for_event(&id, RegistrationRequest::for_user(3))
            .await
            .unwrap_err();
        assert_matches!(&err, ServiceError::Conflict(msg) if msg == "User already registered");
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn insert_conflict_only_for_duplicates() {
        let svc = service();
        let id: i64 = create(&svc, "2099-01-01", 10).await.parse().unwrap();
        let conn = svc.database().conn().unwrap();

        insert_registration(&conn, 1, id).unwrap();
        assert_matches!(
            insert_registration(&conn, 1, id),
            Err(ServiceError::Conflict(msg)) if msg == "User already registered"
        );

        // A user that vanished after the existence check.
        let err = insert_registration(&conn, 404, id).unwrap_err();
        assert_matches!(&err, ServiceError::Store(_));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn register_error_order() {
        let svc = service();
        let future = create(&svc, "2099-01-01", 10).await;
        let past = create(&svc, "2000-01-01", 10).await;

        assert_matches!(
            svc.register_for_event("x", RegistrationRequest::for_user(1)).await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Invalid event ID or user ID"
        );
        assert_matches!(
            svc.register_for_event(&future, RegistrationRequest::default()).await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Invalid event ID or user ID"
        );
        assert_matches!(
            svc.register_for_event("12345", RegistrationRequest::for_user(1)).await,
            Err(ServiceError::NotFound(msg)) if msg == "Event not found"
        );
        // Past check runs before the user lookup.
        assert_matches!(
            svc.register_for_event(&past, RegistrationRequest::for_user(99)).await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Cannot register for past events"
        );
        assert_matches!(
            svc.register_for_event(&future, RegistrationRequest::for_user(99)).await,
            Err(ServiceError::NotFound(msg)) if msg == "User not found"
        );
    }

    #[tokio::test]
    async fn user_id_may_be_numeric_string() {
        let svc = service();
        let id = create(&svc, "2099-01-01", 10).await;
        let req: RegistrationRequest = serde_json::from_value(json!({"userId": "2"})).unwrap();
        assert!(svc.register_for_event(&id, req).await.is_ok());
    }

    #[tokio::test]
    async fn sequential_registrations_never_exceed_capacity() {
        let svc = service();
        let id = create(&svc, "2099-01-01", 2).await;
        for user in [1, 2] {
            let _ = svc
                .register_for_event(&id, RegistrationRequest::for_user(user))
                .await
                .unwrap();
        }
        assert_matches!(
            svc.register_for_event(&id, RegistrationRequest::for_user(3)).await,
            Err(ServiceError::CapacityExceeded)
        );
        let stats = svc.get_event_stats(&id).await.unwrap();
        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.remaining_capacity, 0);
        assert_eq!(stats.percentage_used, "100.00%");
    }

    #[tokio::test]
    async fn cancel_is_stable_when_not_registered() {
        let svc = service();
        let id = create(&svc, "2099-01-01", 2).await;
        for _ in 0..3 {
            assert_matches!(
                svc.cancel_registration(&id, RegistrationRequest::for_user(1)).await,
                Err(ServiceError::NotRegistered)
            );
        }

        let _ = svc
            .register_for_event(&id, RegistrationRequest::for_user(1))
            .await
            .unwrap();
        assert!(svc
            .cancel_registration(&id, RegistrationRequest::for_user(1))
            .await
            .is_ok());
        assert_matches!(
            svc.cancel_registration(&id, RegistrationRequest::for_user(1)).await,
            Err(ServiceError::NotRegistered)
        );
    }

    #[tokio::test]
    async fn cancel_validates_ids() {
        let svc = service();
        assert_matches!(
            svc.cancel_registration("1", RegistrationRequest::default()).await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Invalid event ID or user ID"
        );
    }

    #[tokio::test]
    async fn upcoming_sorted_and_filtered() {
        let svc = service();
        for (title, when, location) in [
            ("A", "2030-01-02", "X"),
            ("B", "2030-01-01", "Z"),
            ("C", "2030-01-01", "A"),
            ("old", "2001-01-01", "A"),
        ] {
            let req = serde_json::from_value(json!({
                "title": title, "datetime": when, "location": location, "capacity": 10
            }))
            .unwrap();
            let _ = svc.create_event(req).await.unwrap();
        }

        let titles: Vec<String> = svc
            .list_upcoming_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["C", "B", "A"]);
    }

    #[tokio::test]
    async fn stats_errors() {
        let svc = service();
        assert_matches!(
            svc.get_event_stats("nope").await,
            Err(ServiceError::InvalidInput(msg)) if msg == "Invalid event ID"
        );
        assert_matches!(
            svc.get_event_stats("77").await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[test]
    fn stats_rounding() {
        assert_eq!(compute_stats(3, 1).percentage_used, "33.33%");
        assert_eq!(compute_stats(3, 2).percentage_used, "66.67%");
        assert_eq!(compute_stats(8, 1).percentage_used, "12.50%");
        assert_eq!(compute_stats(1000, 1).percentage_used, "0.10%");
    }

    #[test]
    fn stats_when_oversold() {
        let stats = compute_stats(2, 3);
        assert_eq!(stats.remaining_capacity, -1);
        assert_eq!(stats.percentage_used, "150.00%");
    }

    #[test]
    fn stats_zero_capacity_does_not_panic() {
        assert_eq!(compute_stats(0, 0).percentage_used, "NaN%");
        assert_eq!(compute_stats(0, 2).percentage_used, "Infinity%");
    }
}
