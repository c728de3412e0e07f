use chrono::NaiveDate;

use crate::model::*;

use super::availability::available_rooms;
use super::{Engine, EngineError};

impl Engine {
    pub fn room_count(&self) -> usize {
        self.store.room_count()
    }

    pub fn booking_count(&self) -> usize {
        self.store.booking_count()
    }

    pub fn get_client(&self, id: Id) -> Option<Client> {
        self.store.get_client(id)
    }

    pub fn get_room(&self, id: Id) -> Option<Room> {
        self.store.get_room(id)
    }

    pub fn get_booking(&self, folio: Id) -> Option<Booking> {
        self.store.get_booking(folio)
    }

    /// All clients ordered by surname, then given name.
    pub fn list_clients(&self) -> Vec<Client> {
        let mut clients = self.store.clients();
        clients.sort_by(|a, b| {
            a.surname
                .cmp(&b.surname)
                .then_with(|| a.given_name.cmp(&b.given_name))
                .then(a.id.cmp(&b.id))
        });
        clients
    }

    /// Rooms with at least one free shift on `date`, each with its free shifts.
    pub fn available_rooms(&self, date: NaiveDate) -> Vec<AvailableRoom> {
        let booked = self.store.booked_slots_on(date);
        available_rooms(&self.store.rooms(), &booked)
    }

    /// Bookings dated within `[start, end]`, ordered by date then folio.
    pub fn bookings_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BookingRow>, EngineError> {
        if start > end {
            return Err(EngineError::ValidationFailed(
                "the start date must not be after the end date".into(),
            ));
        }
        let mut bookings = self.store.bookings_between(start, end);
        bookings.sort_by_key(|b| (b.date, b.folio));
        Ok(bookings.iter().map(|b| self.to_row(b)).collect())
    }

    /// Bookings on exactly `date`, ordered by shift then folio.
    pub fn bookings_on(&self, date: NaiveDate) -> Vec<BookingRow> {
        let mut bookings = self.store.bookings_on(date);
        bookings.sort_by_key(|b| (b.shift, b.folio));
        bookings.iter().map(|b| self.to_row(b)).collect()
    }

    fn to_row(&self, booking: &Booking) -> BookingRow {
        let room_name = self
            .store
            .get_room(booking.room_id)
            .map(|r| r.name)
            .unwrap_or_default();
        let client_name = self
            .store
            .get_client(booking.client_id)
            .map(|c| c.full_name())
            .unwrap_or_default();
        BookingRow {
            folio: booking.folio,
            date: booking.date,
            room_name,
            client_name,
            shift: booking.shift,
            event_name: booking.event_name.clone(),
        }
    }
}
