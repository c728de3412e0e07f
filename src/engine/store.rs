use std::collections::HashSet;

use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::warn;

use crate::model::*;

use super::EngineError;

/// In-memory tables rebuilt from the WAL. All primary keys and the
/// (room, date, shift) triple are unique; inserts that would break either
/// are rejected here, whoever calls them.
pub struct Store {
    clients: DashMap<Id, Client>,
    rooms: DashMap<Id, Room>,
    bookings: DashMap<Id, Booking>,
    /// Unique index: slot → folio.
    slots: DashMap<SlotKey, Id>,
    /// Date → folios booked on that day.
    by_date: DashMap<NaiveDate, Vec<Id>>,
    counters: DashMap<Sequence, Id>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let counters = DashMap::new();
        for seq in Sequence::ALL {
            counters.insert(seq, 1);
        }
        Self {
            clients: DashMap::new(),
            rooms: DashMap::new(),
            bookings: DashMap::new(),
            slots: DashMap::new(),
            by_date: DashMap::new(),
            counters,
        }
    }

    // ── Counters ─────────────────────────────────────────────

    pub fn counter(&self, seq: Sequence) -> Id {
        self.counters.get(&seq).map(|v| *v.value()).unwrap_or(1)
    }

    pub fn set_counter(&self, seq: Sequence, value: Id) {
        self.counters.insert(seq, value);
    }

    /// The id the next record of `seq` gets: the counter, moved past any id
    /// already present in its table.
    pub fn next_id(&self, seq: Sequence) -> Id {
        let mut id = self.counter(seq);
        while id < Id::MAX && self.id_taken(seq, id) {
            id += 1;
        }
        if id != self.counter(seq) {
            warn!("{seq} counter behind stored ids, moved to {id}");
            self.set_counter(seq, id);
        }
        id
    }

    fn id_taken(&self, seq: Sequence, id: Id) -> bool {
        match seq {
            Sequence::Client => self.clients.contains_key(&id),
            Sequence::Room => self.rooms.contains_key(&id),
            Sequence::Folio => self.bookings.contains_key(&id),
        }
    }

    /// Move any counter that sits at or below an id already in its table
    /// past the highest such id. Returns the counters that moved.
    pub fn repair_counters(&self) -> Vec<(Sequence, Id)> {
        let mut repaired = Vec::new();
        for seq in Sequence::ALL {
            let max_used = match seq {
                Sequence::Client => self.clients.iter().map(|e| *e.key()).max(),
                Sequence::Room => self.rooms.iter().map(|e| *e.key()).max(),
                Sequence::Folio => self.bookings.iter().map(|e| *e.key()).max(),
            };
            if let Some(max) = max_used
                && self.counter(seq) <= max {
                    self.set_counter(seq, max + 1);
                    repaired.push((seq, max + 1));
                }
        }
        repaired
    }

    // ── Clients ──────────────────────────────────────────────

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn get_client(&self, id: Id) -> Option<Client> {
        self.clients.get(&id).map(|e| e.value().clone())
    }

    pub fn clients(&self) -> Vec<Client> {
        self.clients.iter().map(|e| e.value().clone()).collect()
    }

    pub fn insert_client(&self, client: Client) -> Result<(), EngineError> {
        match self.clients.entry(client.id) {
            Entry::Occupied(_) => Err(EngineError::AlreadyExists {
                kind: "client",
                id: client.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(client);
                Ok(())
            }
        }
    }

    // ── Rooms ────────────────────────────────────────────────

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn get_room(&self, id: Id) -> Option<Room> {
        self.rooms.get(&id).map(|e| e.value().clone())
    }

    pub fn rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|e| e.value().clone()).collect();
        rooms.sort_by_key(|r| r.id);
        rooms
    }

    pub fn insert_room(&self, room: Room) -> Result<(), EngineError> {
        match self.rooms.entry(room.id) {
            Entry::Occupied(_) => Err(EngineError::AlreadyExists {
                kind: "room",
                id: room.id,
            }),
            Entry::Vacant(slot) => {
                slot.insert(room);
                Ok(())
            }
        }
    }

    // ── Bookings ─────────────────────────────────────────────

    pub fn booking_count(&self) -> usize {
        self.bookings.len()
    }

    pub fn get_booking(&self, folio: Id) -> Option<Booking> {
        self.bookings.get(&folio).map(|e| e.value().clone())
    }

    /// Check the booking's primary key and slot without inserting.
    pub fn check_booking(&self, booking: &Booking) -> Result<(), EngineError> {
        if self.bookings.contains_key(&booking.folio) {
            return Err(EngineError::AlreadyExists {
                kind: "booking",
                id: booking.folio,
            });
        }
        if self.slots.contains_key(&booking.slot()) {
            return Err(conflict(&booking.slot()));
        }
        Ok(())
    }

    /// Insert a booking, claiming its slot in the unique index first.
    pub fn insert_booking(&self, booking: Booking) -> Result<(), EngineError> {
        if self.bookings.contains_key(&booking.folio) {
            return Err(EngineError::AlreadyExists {
                kind: "booking",
                id: booking.folio,
            });
        }
        let key = booking.slot();
        match self.slots.entry(key) {
            Entry::Occupied(_) => return Err(conflict(&key)),
            Entry::Vacant(slot) => {
                slot.insert(booking.folio);
            }
        }
        self.by_date.entry(booking.date).or_default().push(booking.folio);
        self.bookings.insert(booking.folio, booking);
        Ok(())
    }

    pub fn set_event_name(&self, folio: Id, event_name: String) -> Result<(), EngineError> {
        let mut booking = self.bookings.get_mut(&folio).ok_or(EngineError::NotFound {
            kind: "booking",
            id: folio,
        })?;
        booking.event_name = event_name;
        Ok(())
    }

    /// Bookings on exactly `date`, in no particular order.
    pub fn bookings_on(&self, date: NaiveDate) -> Vec<Booking> {
        let folios = self
            .by_date
            .get(&date)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        folios.iter().filter_map(|f| self.get_booking(*f)).collect()
    }

    /// Bookings dated within `[start, end]`, in no particular order.
    pub fn bookings_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Booking> {
        let folios: Vec<Id> = self
            .by_date
            .iter()
            .filter(|e| *e.key() >= start && *e.key() <= end)
            .flat_map(|e| e.value().clone())
            .collect();
        folios.iter().filter_map(|f| self.get_booking(*f)).collect()
    }

    /// The (room, shift) pairs already taken on `date`.
    pub fn booked_slots_on(&self, date: NaiveDate) -> HashSet<(Id, Shift)> {
        self.bookings_on(date)
            .into_iter()
            .map(|b| (b.room_id, b.shift))
            .collect()
    }

    // ── Event application ────────────────────────────────────

    pub fn apply_event(&self, event: &Event) -> Result<(), EngineError> {
        match event {
            Event::ClientRegistered {
                id,
                given_name,
                surname,
            } => self.insert_client(Client {
                id: *id,
                given_name: given_name.clone(),
                surname: surname.clone(),
            }),
            Event::RoomRegistered { id, name, capacity } => self.insert_room(Room {
                id: *id,
                name: name.clone(),
                capacity: *capacity,
            }),
            Event::BookingCreated {
                folio,
                client_id,
                room_id,
                date,
                shift,
                event_name,
            } => self.insert_booking(Booking {
                folio: *folio,
                client_id: *client_id,
                room_id: *room_id,
                date: *date,
                shift: *shift,
                event_name: event_name.clone(),
            }),
            Event::EventRenamed { folio, event_name } => {
                self.set_event_name(*folio, event_name.clone())
            }
            Event::CounterAdvanced { sequence, value } => {
                self.set_counter(*sequence, *value);
                Ok(())
            }
        }
    }

    /// The minimal event list that recreates the current tables and counters.
    pub fn snapshot(&self) -> Vec<Event> {
        let mut events = Vec::new();

        let mut clients = self.clients();
        clients.sort_by_key(|c| c.id);
        events.extend(clients.into_iter().map(|c| Event::ClientRegistered {
            id: c.id,
            given_name: c.given_name,
            surname: c.surname,
        }));

        events.extend(self.rooms().into_iter().map(|r| Event::RoomRegistered {
            id: r.id,
            name: r.name,
            capacity: r.capacity,
        }));

        let mut bookings: Vec<Booking> = self.bookings.iter().map(|e| e.value().clone()).collect();
        bookings.sort_by_key(|b| b.folio);
        events.extend(bookings.into_iter().map(|b| Event::BookingCreated {
            folio: b.folio,
            client_id: b.client_id,
            room_id: b.room_id,
            date: b.date,
            shift: b.shift,
            event_name: b.event_name,
        }));

        for seq in Sequence::ALL {
            events.push(Event::CounterAdvanced {
                sequence: seq,
                value: self.counter(seq),
            });
        }
        events
    }
}

fn conflict(key: &SlotKey) -> EngineError {
    EngineError::AvailabilityConflict {
        room_id: key.room_id,
        date: key.date,
        shift: key.shift,
    }
}
