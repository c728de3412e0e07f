use std::io;

use chrono::NaiveDate;

use crate::console::{Console, Selection, prompt_cancellable, prompt_until};
use crate::engine::EngineError;
use crate::export::ExportFormat;
use crate::model::Id;
use crate::report::{DayReport, RangeReport};
use crate::validate;

use super::{Session, report_error};

/// Show the bookings of a date range and rename the event of one of them.
/// Returns the edited folio.
pub async fn edit_event_name(session: &Session, console: &mut dyn Console) -> io::Result<Option<Id>> {
    let engine = &session.engine;
    if engine.booking_count() == 0 {
        console.write_line("There are no reservations.").await?;
        return Ok(None);
    }

    let Selection::Selected((start, end)) = select_range(console).await? else {
        return Ok(None);
    };
    let report = match RangeReport::query(engine, start, end) {
        Ok(report) => report,
        Err(e) => {
            console.write_line(&e.to_string()).await?;
            return Ok(None);
        }
    };
    if report.is_empty() {
        console.write_line("No reservations in that range.").await?;
        return Ok(None);
    }
    console.write_line(&report.render()).await?;

    let folio = prompt_cancellable(console, "Folio to edit (or CANCEL): ", |s| {
        let folio = validate::parse_id(s)?;
        if report.contains(folio) {
            Ok(folio)
        } else {
            Err(EngineError::ValidationFailed(format!("folio {folio} is not in the range shown")))
        }
    })
    .await?;
    let Selection::Selected(folio) = folio else {
        console.write_line("Operation cancelled.").await?;
        return Ok(None);
    };

    let Selection::Selected(name) =
        prompt_until(console, "New event name: ", validate::event_name).await?
    else {
        return Ok(None);
    };

    match report.rename(engine, folio, &name).await {
        Ok(()) => {
            console.write_line("Event name updated.").await?;
            Ok(Some(folio))
        }
        Err(e) => {
            report_error(console, &e).await?;
            Ok(None)
        }
    }
}

/// Ask for a start and end date until both parse and start <= end.
async fn select_range(console: &mut dyn Console) -> io::Result<Selection<(NaiveDate, NaiveDate)>> {
    loop {
        let Some(start) = console.read_line("Start date (dd/mm/yyyy): ").await? else {
            return Ok(Selection::Cancelled);
        };
        let Some(end) = console.read_line("End date (dd/mm/yyyy): ").await? else {
            return Ok(Selection::Cancelled);
        };
        match parse_range(&start, &end) {
            Ok(range) => return Ok(Selection::Selected(range)),
            Err(e) => console.write_line(&e.to_string()).await?,
        }
    }
}

fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), EngineError> {
    let start = validate::parse_date(start)?;
    let end = validate::parse_date(end)?;
    if start > end {
        return Err(EngineError::ValidationFailed(
            "the start date must not be after the end date".into(),
        ));
    }
    Ok((start, end))
}

/// Show the bookings of one date (today if left blank) and offer an export.
pub async fn query_by_date(session: &Session, console: &mut dyn Console) -> io::Result<()> {
    let engine = &session.engine;
    if engine.booking_count() == 0 {
        console.write_line("There are no reservations registered.").await?;
        return Ok(());
    }

    let today = session.today();
    let Selection::Selected(date) = prompt_until(
        console,
        "Date to query (dd/mm/yyyy) [Enter for today]: ",
        |s| {
            if s.trim().is_empty() {
                Ok(today)
            } else {
                validate::parse_date(s)
            }
        },
    )
    .await?
    else {
        return Ok(());
    };

    let report = DayReport::query(engine, date);
    if report.is_empty() {
        console
            .write_line(&format!("No reservations for {}.", validate::format_date(date)))
            .await?;
        return Ok(());
    }
    console.write_line(&report.render()).await?;

    console
        .write_line("\nExport options:\n1. Export to CSV\n2. Export to JSON\n3. Do not export")
        .await?;
    let Selection::Selected(format) = prompt_until(console, "Select an option: ", parse_export_choice).await?
    else {
        return Ok(());
    };
    if let Some(format) = format {
        match report.export(&session.exporter, format) {
            Ok(path) => {
                console
                    .write_line(&format!("Report exported to {}", path.display()))
                    .await?
            }
            Err(e) => console.write_line(&format!("Export error: {e}")).await?,
        }
    }
    Ok(())
}

fn parse_export_choice(input: &str) -> Result<Option<ExportFormat>, EngineError> {
    match input.trim() {
        "1" => Ok(Some(ExportFormat::Csv)),
        "2" => Ok(Some(ExportFormat::Json)),
        "3" => Ok(None),
        _ => Err(EngineError::ValidationFailed("invalid option".into())),
    }
}
