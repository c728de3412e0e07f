use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::console::table::Table;
use crate::engine::{Engine, EngineError};
use crate::export::{ExportError, ExportFormat, Exporter};
use crate::model::{BookingRow, Id};
use crate::validate::format_date;

/// Bookings in an inclusive date range, as shown to the operator before an edit.
///
/// Edits go through the report so only folios the operator has just seen
/// can be changed.
#[derive(Debug, Clone)]
pub struct RangeReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub rows: Vec<BookingRow>,
    folios: HashSet<Id>,
}

impl RangeReport {
    pub fn query(engine: &Engine, start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        let rows = engine.bookings_in_range(start, end)?;
        let folios = rows.iter().map(|r| r.folio).collect();
        Ok(Self {
            start,
            end,
            rows,
            folios,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, folio: Id) -> bool {
        self.folios.contains(&folio)
    }

    /// Rename the event of a booking listed in this report.
    pub async fn rename(&self, engine: &Engine, folio: Id, event_name: &str) -> Result<(), EngineError> {
        if !self.contains(folio) {
            return Err(EngineError::NotFound { kind: "folio in range", id: folio });
        }
        engine.rename_event(folio, event_name).await
    }

    pub fn render(&self) -> String {
        let mut table = Table::new(
            format!(
                "Reservations between {} and {}",
                format_date(self.start),
                format_date(self.end)
            ),
            &[("Folio", 8), ("Date", 12), ("Room", 20), ("Client", 30), ("Event", 30)],
        );
        for row in &self.rows {
            table.push(vec![
                row.folio.to_string(),
                format_date(row.date),
                row.room_name.clone(),
                row.client_name.clone(),
                row.event_name.clone(),
            ]);
        }
        table.render()
    }
}

/// Bookings on one date, ordered by shift.
#[derive(Debug, Clone)]
pub struct DayReport {
    pub date: NaiveDate,
    pub rows: Vec<BookingRow>,
}

impl DayReport {
    pub fn query(engine: &Engine, date: NaiveDate) -> Self {
        Self {
            date,
            rows: engine.bookings_on(date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut table = Table::new(
            format!("RESERVATIONS REPORT FOR {}", format_date(self.date)),
            &[
                ("Folio", 8),
                ("Date", 12),
                ("Room", 20),
                ("Client", 25),
                ("Shift", 12),
                ("Event", 25),
            ],
        );
        for row in &self.rows {
            table.push(vec![
                row.folio.to_string(),
                format_date(row.date),
                row.room_name.clone(),
                row.client_name.clone(),
                row.shift.to_string(),
                row.event_name.clone(),
            ]);
        }
        table.render()
    }

    /// Hand the rows, unchanged, to the exporter.
    pub fn export(&self, exporter: &Exporter, format: ExportFormat) -> Result<PathBuf, ExportError> {
        exporter.export(&self.rows, self.date, format)
    }
}
