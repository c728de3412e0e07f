use std::io;

use chrono::NaiveDate;

use crate::console::table::Table;
use crate::console::{Console, Selection, prompt_cancellable, prompt_until};
use crate::engine::{BookingRequest, Engine, EngineError};
use crate::model::*;
use crate::validate::{self, DateCheck};

use super::{Session, report_error};

/// How an interactive booking attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Created(Id),
    /// The operator backed out; nothing was written.
    Cancelled,
    /// A precondition or the commit failed; nothing was written.
    Aborted(EngineError),
}

/// Walk the operator through client, date, room, shift and event name,
/// then commit.
pub async fn create_booking(session: &Session, console: &mut dyn Console) -> io::Result<BookingOutcome> {
    let engine = &session.engine;
    if engine.room_count() == 0 {
        return abort(console, EngineError::NoRoomsRegistered).await;
    }

    let Selection::Selected(client_id) = select_client(engine, console).await? else {
        return cancelled(console).await;
    };

    let Selection::Selected(date) = select_date(console, session.today()).await? else {
        return cancelled(console).await;
    };

    let available = engine.available_rooms(date);
    if available.is_empty() {
        return abort(console, EngineError::NoAvailability(date)).await;
    }
    console.write_line(&render_available(&available)).await?;

    let Selection::Selected((room_id, shift)) = select_room_and_shift(console, &available).await? else {
        return cancelled(console).await;
    };

    let Selection::Selected(event_name) =
        prompt_until(console, "Event name: ", validate::event_name).await?
    else {
        return cancelled(console).await;
    };

    let request = BookingRequest {
        client_id,
        room_id,
        date,
        shift,
        event_name,
    };
    match engine.create_booking(request).await {
        Ok(folio) => {
            console
                .write_line(&format!("Booking created. Folio: {folio}"))
                .await?;
            Ok(BookingOutcome::Created(folio))
        }
        Err(e) => abort(console, e).await,
    }
}

async fn abort(console: &mut dyn Console, error: EngineError) -> io::Result<BookingOutcome> {
    report_error(console, &error).await?;
    Ok(BookingOutcome::Aborted(error))
}

async fn cancelled(console: &mut dyn Console) -> io::Result<BookingOutcome> {
    console.write_line("Operation cancelled.").await?;
    Ok(BookingOutcome::Cancelled)
}

/// List clients and let the operator pick one by id.
async fn select_client(engine: &Engine, console: &mut dyn Console) -> io::Result<Selection<Id>> {
    let clients = engine.list_clients();
    if clients.is_empty() {
        console.write_line("No clients registered.").await?;
        return Ok(Selection::Cancelled);
    }

    let mut table = Table::new(
        "Registered clients",
        &[("Id", 6), ("Surname", 25), ("Given name", 25)],
    );
    for c in &clients {
        table.push(vec![c.id.to_string(), c.surname.clone(), c.given_name.clone()]);
    }
    console.write_line(&table.render()).await?;

    prompt_cancellable(console, "Client id (or CANCEL): ", |s| {
        let id = validate::parse_id(s)?;
        clients
            .iter()
            .any(|c| c.id == id)
            .then_some(id)
            .ok_or(EngineError::NotFound { kind: "client", id })
    })
    .await
}

/// Prompt until the date is parseable, far enough ahead and not on the
/// excluded weekday. An excluded date offers the next day instead;
/// declining asks for a new date.
async fn select_date(console: &mut dyn Console, today: NaiveDate) -> io::Result<Selection<NaiveDate>> {
    let prompt = format!(
        "Booking date (dd/mm/yyyy), {} or later: ",
        validate::format_date(validate::min_booking_date(today))
    );
    loop {
        let Some(line) = console.read_line(&prompt).await? else {
            return Ok(Selection::Cancelled);
        };
        let checked = validate::parse_date(&line).and_then(|d| validate::check_booking_date(d, today));
        match checked {
            Ok(DateCheck::Accepted(date)) => return Ok(Selection::Selected(date)),
            Ok(DateCheck::Excluded { substitute, .. }) => {
                console.write_line(&validate::excluded_weekday_notice()).await?;
                let question = format!(
                    "Use the suggested date {} instead? (Y/N): ",
                    validate::format_date(substitute)
                );
                let Some(answer) = console.read_line(&question).await? else {
                    return Ok(Selection::Cancelled);
                };
                if answer.trim().eq_ignore_ascii_case("Y") {
                    return Ok(Selection::Selected(substitute));
                }
            }
            Err(e) => console.write_line(&e.to_string()).await?,
        }
    }
}

/// Pick a room from `available`, then one of its free shifts.
async fn select_room_and_shift(
    console: &mut dyn Console,
    available: &[AvailableRoom],
) -> io::Result<Selection<(Id, Shift)>> {
    let Selection::Selected(room) = prompt_cancellable(console, "Room id (or CANCEL): ", |s| {
        let id = validate::parse_id(s)?;
        available
            .iter()
            .find(|a| a.room.id == id)
            .ok_or(EngineError::NotFound { kind: "available room", id })
    })
    .await?
    else {
        return Ok(Selection::Cancelled);
    };

    let prompt = format!("Shift ({}) or CANCEL: ", join_shifts(&room.free_shifts));
    let shift = prompt_cancellable(console, &prompt, |s| {
        let shift: Shift = s
            .parse()
            .map_err(|e: UnknownShift| EngineError::InvalidFormat(e.to_string()))?;
        if room.is_free(shift) {
            Ok(shift)
        } else {
            Err(EngineError::ValidationFailed(format!(
                "{shift} is not available for this room"
            )))
        }
    })
    .await?;

    Ok(match shift {
        Selection::Selected(shift) => Selection::Selected((room.room.id, shift)),
        Selection::Cancelled => Selection::Cancelled,
    })
}

fn join_shifts(shifts: &[Shift]) -> String {
    shifts.iter().map(Shift::as_str).collect::<Vec<_>>().join(", ")
}

fn render_available(available: &[AvailableRoom]) -> String {
    let mut table = Table::new(
        "Available rooms",
        &[("Id", 6), ("Name", 25), ("Capacity", 10), ("Free shifts", 35)],
    );
    for a in available {
        table.push(vec![
            a.room.id.to_string(),
            a.room.name.clone(),
            a.room.capacity.to_string(),
            join_shifts(&a.free_shifts),
        ]);
    }
    table.render()
}
