//! Writes a day report to a flat file under the export directory.
//!
//! The file name is derived from the report date with slashes replaced by
//! hyphens, e.g. `reservations_report_20-10-2026.csv`. Failures are returned
//! to the caller to report; they never affect the store.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::{BookingRow, Id};
use crate::validate::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// One exported row. Field names form the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub folio: Id,
    pub date: String,
    pub room: String,
    pub client: String,
    pub shift: String,
    pub event: String,
}

impl From<&BookingRow> for ExportRecord {
    fn from(row: &BookingRow) -> Self {
        Self {
            folio: row.folio,
            date: format_date(row.date),
            room: row.room_name.clone(),
            client: row.client_name.clone(),
            shift: row.shift.to_string(),
            event: row.event_name.clone(),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    CreateDir { path: PathBuf, source: io::Error },
    Io { path: PathBuf, source: io::Error },
    Csv { path: PathBuf, source: csv::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::CreateDir { path, source } => {
                write!(f, "cannot create export directory {}: {source}", path.display())
            }
            ExportError::Io { path, source } => write!(f, "cannot write {}: {source}", path.display()),
            ExportError::Csv { path, source } => {
                write!(f, "CSV export to {} failed: {source}", path.display())
            }
            ExportError::Json { path, source } => {
                write!(f, "JSON export to {} failed: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::CreateDir { source, .. } | ExportError::Io { source, .. } => Some(source),
            ExportError::Csv { source, .. } => Some(source),
            ExportError::Json { source, .. } => Some(source),
        }
    }
}

pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target path for a report of `date`.
    pub fn path_for(&self, date: NaiveDate, format: ExportFormat) -> PathBuf {
        let stamp = format_date(date).replace('/', "-");
        self.dir
            .join(format!("reservations_report_{stamp}.{}", format.extension()))
    }

    /// Write `rows` for `date`, creating the export directory if needed.
    /// Returns the written path.
    pub fn export(
        &self,
        rows: &[BookingRow],
        date: NaiveDate,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        let result = self.write(rows, date, format);
        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            crate::observability::EXPORTS_TOTAL,
            "format" => format.extension(),
            "status" => status
        )
        .increment(1);
        match &result {
            Ok(path) => info!("exported {} rows to {}", rows.len(), path.display()),
            Err(e) => warn!("export failed: {e}"),
        }
        result
    }

    fn write(
        &self,
        rows: &[BookingRow],
        date: NaiveDate,
        format: ExportFormat,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(date, format);
        let records: Vec<ExportRecord> = rows.iter().map(ExportRecord::from).collect();
        match format {
            ExportFormat::Csv => write_csv(&path, &records)?,
            ExportFormat::Json => write_json(&path, &records)?,
        }
        Ok(path)
    }
}

fn write_csv(path: &Path, records: &[ExportRecord]) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    if records.is_empty() {
        writer
            .write_record(["folio", "date", "room", "client", "shift", "event"])
            .map_err(csv_err)?;
    }
    for record in records {
        writer.serialize(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json(path: &Path, records: &[ExportRecord]) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}
