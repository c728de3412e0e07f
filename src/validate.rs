//! Pure checks over operator input. Nothing here touches the store.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::engine::EngineError;
use crate::limits::*;
use crate::model::Id;

pub fn non_empty(text: &str) -> bool {
    !text.trim().is_empty()
}

/// True if the trimmed text is non-empty and made only of letters
/// (accented letters and ñ included) and whitespace.
pub fn letters_and_spaces(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace())
}

/// Upper-case the first letter of every word, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

pub fn parse_date(text: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| EngineError::InvalidFormat(format!("{:?} is not a dd/mm/yyyy date", text.trim())))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn is_excluded_weekday(date: NaiveDate) -> bool {
    date.weekday() == EXCLUDED_WEEKDAY
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Shown when a requested date falls on the excluded weekday.
pub fn excluded_weekday_notice() -> String {
    format!("Bookings are not taken on {}s.", weekday_name(EXCLUDED_WEEKDAY))
}

/// Earliest date a booking made today may use.
pub fn min_booking_date(today: NaiveDate) -> NaiveDate {
    today + chrono::Duration::days(MIN_LEAD_DAYS)
}

/// Outcome of checking a requested booking date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCheck {
    Accepted(NaiveDate),
    /// The date falls on the excluded weekday; the following day is offered instead.
    Excluded { requested: NaiveDate, substitute: NaiveDate },
}

pub fn check_booking_date(date: NaiveDate, today: NaiveDate) -> Result<DateCheck, EngineError> {
    let min = min_booking_date(today);
    if date < min {
        return Err(EngineError::ValidationFailed(format!(
            "the date must be {} or later",
            format_date(min)
        )));
    }
    if is_excluded_weekday(date) {
        let substitute = date
            .checked_add_days(Days::new(1))
            .ok_or(EngineError::LimitExceeded("date out of range"))?;
        return Ok(DateCheck::Excluded {
            requested: date,
            substitute,
        });
    }
    Ok(DateCheck::Accepted(date))
}

pub fn parse_id(text: &str) -> Result<Id, EngineError> {
    text.trim()
        .parse::<Id>()
        .map_err(|_| EngineError::InvalidFormat(format!("{:?} is not a valid id", text.trim())))
}

pub fn parse_capacity(text: &str) -> Result<u32, EngineError> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| EngineError::InvalidFormat(format!("{:?} is not a number", text.trim())))?;
    if value <= 0 {
        return Err(EngineError::ValidationFailed(
            "capacity must be a positive integer".into(),
        ));
    }
    u32::try_from(value).map_err(|_| EngineError::LimitExceeded("capacity too large"))
}

/// Validate a given name or surname and return it title-cased.
pub fn person_name(text: &str, field: &str) -> Result<String, EngineError> {
    if !letters_and_spaces(text) {
        return Err(EngineError::ValidationFailed(format!(
            "{field} must contain only letters and spaces"
        )));
    }
    let trimmed = text.trim();
    if trimmed.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("name too long"));
    }
    Ok(title_case(trimmed))
}

/// Validate a room name and return it title-cased.
pub fn room_name(text: &str) -> Result<String, EngineError> {
    if !non_empty(text) {
        return Err(EngineError::ValidationFailed("room name must not be empty".into()));
    }
    let trimmed = text.trim();
    if trimmed.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("room name too long"));
    }
    Ok(title_case(trimmed))
}

pub fn event_name(text: &str) -> Result<String, EngineError> {
    if !non_empty(text) {
        return Err(EngineError::ValidationFailed("event name must not be empty".into()));
    }
    let trimmed = text.trim();
    if trimmed.len() > MAX_EVENT_NAME_LEN {
        return Err(EngineError::LimitExceeded("event name too long"));
    }
    Ok(trimmed.to_string())
}
