use chrono::NaiveDate;

use crate::model::{Id, Shift};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Input does not parse (date, number, shift).
    InvalidFormat(String),
    /// Input parses but breaks a business rule.
    ValidationFailed(String),
    NotFound {
        kind: &'static str,
        id: Id,
    },
    AlreadyExists {
        kind: &'static str,
        id: Id,
    },
    NoRoomsRegistered,
    NoAvailability(NaiveDate),
    AvailabilityConflict {
        room_id: Id,
        date: NaiveDate,
        shift: Shift,
    },
    UnknownSequence(String),
    LimitExceeded(&'static str),
    WalError(String),
}

impl EngineError {
    /// Errors the operator can fix by answering the prompt again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidFormat(_)
                | EngineError::ValidationFailed(_)
                | EngineError::NotFound { .. }
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidFormat(msg) => write!(f, "invalid format: {msg}"),
            EngineError::ValidationFailed(msg) => write!(f, "{msg}"),
            EngineError::NotFound { kind, id } => write!(f, "{kind} {id} not found"),
            EngineError::AlreadyExists { kind, id } => write!(f, "{kind} {id} already exists"),
            EngineError::NoRoomsRegistered => {
                write!(f, "no rooms registered; register at least one room first")
            }
            EngineError::NoAvailability(date) => {
                write!(f, "no rooms available on {}", date.format(crate::limits::DATE_FORMAT))
            }
            EngineError::AvailabilityConflict {
                room_id,
                date,
                shift,
            } => write!(
                f,
                "availability conflict: room {room_id} is already booked on {} ({shift})",
                date.format(crate::limits::DATE_FORMAT)
            ),
            EngineError::UnknownSequence(name) => write!(f, "unknown sequence: {name:?}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
