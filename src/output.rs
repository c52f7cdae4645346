use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::category::Category;
use crate::record::DefacementRecord;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// `<DDMMYYYY>_<identifier>.<ext>`, e.g. `19102026_mz.csv`.
pub fn default_filename(date: NaiveDate, category: &Category, format: OutputFormat) -> String {
    format!(
        "{}_{}.{}",
        date.format("%d%m%Y"),
        category.identifier(),
        format.extension()
    )
}

pub fn write_csv<W: Write>(writer: W, records: &[DefacementRecord]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(DefacementRecord::CSV_HEADER)?;
    for record in records {
        wtr.write_record(record.csv_row())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Pretty JSON array with four-space indentation.
pub fn write_json<W: Write>(writer: W, records: &[DefacementRecord]) -> Result<(), OutputError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    records.serialize(&mut ser)?;
    Ok(())
}

pub fn save(
    path: &Path,
    records: &[DefacementRecord],
    format: OutputFormat,
) -> Result<(), OutputError> {
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Csv => write_csv(&mut out, records)?,
        OutputFormat::Json => write_json(&mut out, records)?,
    }
    out.flush()?;
    info!(
        "Data successfully written to {} in {} format",
        path.display(),
        format.extension().to_uppercase()
    );
    Ok(())
}
