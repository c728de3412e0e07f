use chrono::NaiveDate;
use tracing::{info, warn};

use crate::limits::*;
use crate::model::*;
use crate::validate;

use super::counters::advanced_past;
use super::{Engine, EngineError};

/// Everything the booking flow collects before commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub client_id: Id,
    pub room_id: Id,
    pub date: NaiveDate,
    pub shift: Shift,
    pub event_name: String,
}

impl Engine {
    /// Register a client. Names must be letters and spaces; they are stored title-cased.
    pub async fn register_client(&self, given_name: &str, surname: &str) -> Result<Id, EngineError> {
        let given_name = validate::person_name(given_name, "given name")?;
        let surname = validate::person_name(surname, "surname")?;
        if self.store.client_count() >= MAX_CLIENTS {
            return Err(EngineError::LimitExceeded("too many clients"));
        }

        let _commit = self.commit.lock().await;
        let id = self.store.next_id(Sequence::Client);
        if self.store.get_client(id).is_some() {
            return Err(EngineError::AlreadyExists { kind: "client", id });
        }
        let events = [
            Event::ClientRegistered { id, given_name, surname },
            advanced_past(Sequence::Client, id)?,
        ];
        self.persist_and_apply(&events).await?;

        info!("registered client {id}");
        metrics::counter!(crate::observability::CLIENTS_REGISTERED_TOTAL).increment(1);
        Ok(id)
    }

    /// Register a room. The name is stored title-cased; capacity must be positive.
    pub async fn register_room(&self, name: &str, capacity: u32) -> Result<Id, EngineError> {
        let name = validate::room_name(name)?;
        if capacity == 0 {
            return Err(EngineError::ValidationFailed(
                "capacity must be a positive integer".into(),
            ));
        }
        if self.store.room_count() >= MAX_ROOMS {
            return Err(EngineError::LimitExceeded("too many rooms"));
        }

        let _commit = self.commit.lock().await;
        let id = self.store.next_id(Sequence::Room);
        if self.store.get_room(id).is_some() {
            return Err(EngineError::AlreadyExists { kind: "room", id });
        }
        let events = [
            Event::RoomRegistered { id, name, capacity },
            advanced_past(Sequence::Room, id)?,
        ];
        self.persist_and_apply(&events).await?;

        info!("registered room {id}");
        metrics::counter!(crate::observability::ROOMS_REGISTERED_TOTAL).increment(1);
        Ok(id)
    }

    /// Commit a booking and return its folio.
    ///
    /// Availability shown to the operator was computed earlier without a lock,
    /// so the slot is re-checked against the store's unique index here. On
    /// `AvailabilityConflict` nothing is written and the folio counter stays put.
    /// The booking and its counter advance commit as one WAL batch.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Id, EngineError> {
        let event_name = validate::event_name(&request.event_name)?;
        if self.store.get_client(request.client_id).is_none() {
            return Err(EngineError::NotFound {
                kind: "client",
                id: request.client_id,
            });
        }
        if self.store.get_room(request.room_id).is_none() {
            return Err(EngineError::NotFound {
                kind: "room",
                id: request.room_id,
            });
        }
        if self.store.booking_count() >= MAX_BOOKINGS {
            return Err(EngineError::LimitExceeded("too many bookings"));
        }

        let _commit = self.commit.lock().await;
        let folio = self.store.next_id(Sequence::Folio);
        let booking = Booking {
            folio,
            client_id: request.client_id,
            room_id: request.room_id,
            date: request.date,
            shift: request.shift,
            event_name,
        };

        if let Err(e) = self.store.check_booking(&booking) {
            if matches!(e, EngineError::AvailabilityConflict { .. }) {
                warn!("booking rejected: {e}");
                metrics::counter!(crate::observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            }
            return Err(e);
        }

        let events = [
            Event::BookingCreated {
                folio,
                client_id: booking.client_id,
                room_id: booking.room_id,
                date: booking.date,
                shift: booking.shift,
                event_name: booking.event_name,
            },
            advanced_past(Sequence::Folio, folio)?,
        ];
        self.persist_and_apply(&events).await?;

        info!(
            "booking {folio}: room {} on {} ({})",
            request.room_id,
            validate::format_date(request.date),
            request.shift
        );
        metrics::counter!(crate::observability::BOOKINGS_CREATED_TOTAL).increment(1);
        Ok(folio)
    }

    /// Replace the event name of an existing booking.
    pub async fn rename_event(&self, folio: Id, event_name: &str) -> Result<(), EngineError> {
        let event_name = validate::event_name(event_name)?;
        let _commit = self.commit.lock().await;
        if self.store.get_booking(folio).is_none() {
            return Err(EngineError::NotFound { kind: "booking", id: folio });
        }
        self.persist_and_apply(&[Event::EventRenamed { folio, event_name }])
            .await?;

        info!("booking {folio}: event renamed");
        metrics::counter!(crate::observability::EVENT_RENAMES_TOTAL).increment(1);
        Ok(())
    }
}
