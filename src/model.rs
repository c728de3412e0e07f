use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier of a client or room ("clave") and of a booking ("folio").
pub type Id = u32;

/// One of the three fixed booking slots of a day.
///
/// Declaration order is the canonical order used when sorting a day report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Afternoon => "Afternoon",
            Shift::Night => "Night",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input is canonicalized to title case before comparison, so
/// `"morning"`, `"MORNING"` and `" Morning "` all resolve to `Shift::Morning`.
impl FromStr for Shift {
    type Err = UnknownShift;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical = capitalize(s.trim());
        Shift::ALL
            .into_iter()
            .find(|shift| shift.as_str() == canonical)
            .ok_or_else(|| UnknownShift(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownShift(pub String);

impl fmt::Display for UnknownShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown shift: {:?}", self.0)
    }
}

impl std::error::Error for UnknownShift {}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// The three independent id sequences kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sequence {
    Client,
    Room,
    Folio,
}

impl Sequence {
    pub const ALL: [Sequence; 3] = [Sequence::Client, Sequence::Room, Sequence::Folio];

    pub fn name(&self) -> &'static str {
        match self {
            Sequence::Client => "client",
            Sequence::Room => "room",
            Sequence::Folio => "folio",
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    pub given_name: String,
    pub surname: String,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.surname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
    pub capacity: u32,
}

/// The unique key of a booking: at most one booking per room, date and shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub room_id: Id,
    pub date: NaiveDate,
    pub shift: Shift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub folio: Id,
    pub client_id: Id,
    pub room_id: Id,
    pub date: NaiveDate,
    pub shift: Shift,
    /// The only field that may change after creation.
    pub event_name: String,
}

impl Booking {
    pub fn slot(&self) -> SlotKey {
        SlotKey {
            room_id: self.room_id,
            date: self.date,
            shift: self.shift,
        }
    }
}

/// The event types. This is the WAL record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ClientRegistered {
        id: Id,
        given_name: String,
        surname: String,
    },
    RoomRegistered {
        id: Id,
        name: String,
        capacity: u32,
    },
    BookingCreated {
        folio: Id,
        client_id: Id,
        room_id: Id,
        date: NaiveDate,
        shift: Shift,
        event_name: String,
    },
    EventRenamed {
        folio: Id,
        event_name: String,
    },
    /// `value` is the counter value after the advance.
    CounterAdvanced {
        sequence: Sequence,
        value: Id,
    },
}

// ── Query result types ───────────────────────────────────────────

/// A room with at least one free shift on the queried date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableRoom {
    pub room: Room,
    /// Free shifts in canonical order, never empty.
    pub free_shifts: Vec<Shift>,
}

impl AvailableRoom {
    pub fn is_free(&self, shift: Shift) -> bool {
        self.free_shifts.contains(&shift)
    }
}

/// A booking joined with its room name and client full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRow {
    pub folio: Id,
    pub date: NaiveDate,
    pub room_name: String,
    pub client_name: String,
    pub shift: Shift,
    pub event_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_parse_is_case_insensitive() {
        assert_eq!("morning".parse::<Shift>(), Ok(Shift::Morning));
        assert_eq!("AFTERNOON".parse::<Shift>(), Ok(Shift::Afternoon));
        assert_eq!("  nIGHT ".parse::<Shift>(), Ok(Shift::Night));
    }

    #[test]
    fn shift_parse_rejects_unknown() {
        assert_eq!(
            "evening".parse::<Shift>(),
            Err(UnknownShift("evening".into()))
        );
        assert!("".parse::<Shift>().is_err());
    }

    #[test]
    fn shift_canonical_order() {
        let mut shifts = vec![Shift::Night, Shift::Morning, Shift::Afternoon];
        shifts.sort();
        assert_eq!(shifts, Shift::ALL.to_vec());
    }

    #[test]
    fn booking_slot_key() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let b = Booking {
            folio: 7,
            client_id: 1,
            room_id: 3,
            date,
            shift: Shift::Night,
            event_name: "Gala".into(),
        };
        assert_eq!(
            b.slot(),
            SlotKey {
                room_id: 3,
                date,
                shift: Shift::Night
            }
        );
    }

    #[test]
    fn client_full_name() {
        let c = Client {
            id: 1,
            given_name: "Ana".into(),
            surname: "Lopez".into(),
        };
        assert_eq!(c.full_name(), "Ana Lopez");
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::BookingCreated {
            folio: 1,
            client_id: 2,
            room_id: 3,
            date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            shift: Shift::Afternoon,
            event_name: "Año Nuevo".into(),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
