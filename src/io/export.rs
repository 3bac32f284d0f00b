//! Stage outputs.
//!
//! Every writer serializes the complete output in memory first and touches the
//! filesystem once at the end, so a failing stage never leaves a partial file
//! behind.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::info;

use crate::domain::OutputConfig;
use crate::error::{AppError, Result};
use crate::io::table::Table;

/// Output path for a stage: `<stem><suffix><.ext>` next to the input.
///
/// `data/run1.csv` + `_fft` → `data/run1_fft.csv`. Inputs without an
/// extension get none.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map(OsString::from).unwrap_or_default();
    let mut name = stem;
    name.push(suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Round to `precision` decimals for persistence.
///
/// Exact halfway cases round to even. Negative zero is written as `0`.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (value * scale).round_ties_even() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn format_value(value: f64, precision: u32) -> String {
    format!("{}", round_to(value, precision))
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> AppError + '_ {
    move |e| AppError::Csv {
        path: path.to_path_buf(),
        source: e,
    }
}

fn into_bytes(writer: csv::Writer<Vec<u8>>, path: &Path) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| AppError::io(path, e.into_error()))
}

fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| AppError::io(path, e))
}

/// Write a table with a header row, rounding every value.
pub fn write_table(path: &Path, table: &Table, config: OutputConfig) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers).map_err(csv_err(path))?;

    for row in 0..table.len() {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|c| format_value(c[row], config.precision))
            .collect();
        writer.write_record(&record).map_err(csv_err(path))?;
    }

    let bytes = into_bytes(writer, path)?;
    persist(path, &bytes)?;
    info!(path = %path.display(), rows = table.len(), columns = table.headers.len(), "wrote table");
    Ok(())
}

/// Write rows verbatim without a header.
pub fn write_rows(path: &Path, rows: &[StringRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for record in rows {
        writer.write_record(record).map_err(csv_err(path))?;
    }

    let bytes = into_bytes(writer, path)?;
    persist(path, &bytes)?;
    info!(path = %path.display(), rows = rows.len(), "wrote rows");
    Ok(())
}
