use std::str::FromStr;

use crate::model::{Event, Id, Sequence};

use super::{Engine, EngineError};

impl FromStr for Sequence {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sequence::ALL
            .into_iter()
            .find(|seq| seq.name() == s)
            .ok_or_else(|| EngineError::UnknownSequence(s.to_string()))
    }
}

impl Engine {
    /// Current value of a named sequence: the id the next successful
    /// creation of that kind will receive. Never mutates.
    pub fn peek(&self, sequence: &str) -> Result<Id, EngineError> {
        let seq: Sequence = sequence.parse()?;
        Ok(self.store.counter(seq))
    }

    /// Durably increment a named sequence by one and return the new value.
    pub async fn advance(&self, sequence: &str) -> Result<Id, EngineError> {
        let seq: Sequence = sequence.parse()?;
        let _commit = self.commit.lock().await;
        let event = advanced_past(seq, self.store.counter(seq))?;
        self.persist_and_apply(std::slice::from_ref(&event)).await?;
        Ok(self.store.counter(seq))
    }
}

/// The counter record that moves `seq` past `used`. Committed in the same
/// WAL batch as the record that took `used`.
pub(super) fn advanced_past(seq: Sequence, used: Id) -> Result<Event, EngineError> {
    let value = used
        .checked_add(1)
        .ok_or(EngineError::LimitExceeded("sequence exhausted"))?;
    Ok(Event::CounterAdvanced {
        sequence: seq,
        value,
    })
}
