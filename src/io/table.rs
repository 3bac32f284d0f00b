//! CSV ingest.
//!
//! Two input shapes are supported:
//!
//! - **stage tables**: a header row followed by numeric rows, as written by
//!   every stage of this tool. Columns are addressed by exact header name.
//! - **raw captures**: headerless files, possibly preceded by free-form
//!   metadata lines. Data starts at the first line whose first field parses as
//!   a number; everything before it is skipped.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{RepresentationKind, SignalRepresentation};
use crate::domain::{COL_IFFT_IMAG, COL_IFFT_MAGNITUDE, COL_IFFT_REAL};
use crate::error::{AppError, Result};

/// Column-oriented numeric table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<f64>>,
    /// Where the table came from, for error messages.
    pub source: String,
}

impl Table {
    /// Build a table from named columns of equal length.
    pub fn from_columns<S: Into<String>>(source: S, named: Vec<(&str, Vec<f64>)>) -> Result<Self> {
        let source = source.into();
        if let Some(first) = named.first() {
            let n = first.1.len();
            if let Some((name, col)) = named.iter().find(|(_, c)| c.len() != n) {
                return Err(AppError::InvalidInput(format!(
                    "{source}: column `{name}` has {} rows, expected {n}",
                    col.len()
                )));
            }
        }
        let (headers, columns): (Vec<String>, Vec<Vec<f64>>) =
            named.into_iter().map(|(h, c)| (h.to_string(), c)).unzip();
        Ok(Self {
            headers,
            columns,
            source,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.has_column(n))
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::missing_column(&self.source, name, &self.headers))
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        let idx = self.position(name)?;
        Ok(&self.columns[idx])
    }

    /// Mutable access to several distinct columns at once.
    pub fn columns_mut(&mut self, names: &[&str]) -> Result<Vec<&mut Vec<f64>>> {
        for name in names {
            self.position(name)?;
        }
        Ok(self
            .headers
            .iter()
            .zip(self.columns.iter_mut())
            .filter(|(h, _)| names.contains(&h.as_str()))
            .map(|(_, c)| c)
            .collect())
    }

    /// Whether the table carries all three inverse-transform columns.
    pub fn is_inverse_output(&self) -> bool {
        self.has_columns(&[COL_IFFT_REAL, COL_IFFT_IMAG, COL_IFFT_MAGNITUDE])
    }

    /// Rebuild a transform input from the inverse-transform columns.
    pub fn representation(&self, kind: RepresentationKind) -> Result<SignalRepresentation> {
        let fetch = |name: &str| -> Result<Vec<f64>> {
            self.column(name).map(<[f64]>::to_vec).map_err(|_| AppError::InvalidRepresentation {
                representation: kind.display_name(),
                reason: format!(
                    "{}: column `{name}` not found (found: {})",
                    self.source,
                    self.headers.join(", ")
                ),
            })
        };

        Ok(match kind {
            RepresentationKind::Complex => SignalRepresentation::Complex {
                real: fetch(COL_IFFT_REAL)?,
                imag: fetch(COL_IFFT_IMAG)?,
            },
            RepresentationKind::Real => SignalRepresentation::RealOnly(fetch(COL_IFFT_REAL)?),
            RepresentationKind::Imag => SignalRepresentation::ImagOnly(fetch(COL_IFFT_IMAG)?),
            RepresentationKind::Magnitude => {
                SignalRepresentation::MagnitudeOnly(fetch(COL_IFFT_MAGNITUDE)?)
            }
        })
    }
}

/// Headerless rows, kept verbatim.
#[derive(Debug, Clone)]
pub struct RawRows {
    pub records: Vec<StringRecord>,
    /// Leading non-numeric lines that were skipped.
    pub skipped: usize,
    pub source: String,
}

impl RawRows {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse field `col` of every row as a number.
    pub fn numeric_column(&self, col: usize) -> Result<Vec<f64>> {
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let field = record.get(col).ok_or_else(|| AppError::MissingColumn {
                    file: self.source.clone(),
                    column: format!("column {col}"),
                    found: format!("{} field(s) on data row {}", record.len(), row + 1),
                })?;
                parse_number(field).ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "{}: data row {}, column {col}: `{field}` is not a number",
                        self.source,
                        row + 1
                    ))
                })
            })
            .collect()
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| AppError::io(path, e))
}

/// Read a stage table (header row + numeric rows).
pub fn read_table(path: &Path) -> Result<Table> {
    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut columns = vec![Vec::new(); headers.len()];
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, after the header.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        for (col, (name, values)) in headers.iter().zip(columns.iter_mut()).enumerate() {
            let field = record.get(col).unwrap_or("");
            let value = parse_number(field).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "{source}: line {line}, column `{name}`: `{field}` is not a number"
                ))
            })?;
            values.push(value);
        }
    }

    debug!(path = %source, columns = headers.len(), rows = columns.first().map_or(0, Vec::len), "read table");
    Ok(Table {
        headers,
        columns,
        source,
    })
}

/// Read a headerless capture, skipping leading non-numeric lines.
pub fn read_raw_rows(path: &Path) -> Result<RawRows> {
    let source = path.display().to_string();
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(open(path)?);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for result in reader.into_records() {
        let record = result.map_err(|e| AppError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        if records.is_empty() {
            let starts_numeric = record.get(0).and_then(parse_number).is_some();
            if !starts_numeric {
                skipped += 1;
                continue;
            }
        }
        records.push(record);
    }

    debug!(path = %source, skipped, rows = records.len(), "read raw rows");
    Ok(RawRows {
        records,
        skipped,
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::COL_PHASE;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_named_columns() {
        let f = write_temp("FFT Bin,Power,Phase\n0,1.5,0.1\n1,2.5,-0.2\n");
        let table = read_table(f.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column(COL_PHASE).unwrap(), &[0.1, -0.2]);
    }

    #[test]
    fn missing_column_names_what_was_found() {
        let f = write_temp("a,b\n1,2\n");
        let table = read_table(f.path()).unwrap();
        match table.column("Phase").unwrap_err() {
            AppError::MissingColumn { column, found, .. } => {
                assert_eq!(column, "Phase");
                assert_eq!(found, "a, b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bom_prefixed_header_is_normalized() {
        let f = write_temp("\u{feff}IFFT Real,IFFT Imag,IFFT Magnitude\n1,0,1\n");
        let table = read_table(f.path()).unwrap();
        assert!(table.is_inverse_output());
    }

    #[test]
    fn non_numeric_cell_reports_line() {
        let f = write_temp("x\n1\nfoo\n");
        let err = read_table(f.path()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn raw_rows_skip_metadata() {
        let f = write_temp("Instrument: scope\nDate,2024-01-01\nmeas,ref\n1.0,-0.5\n2.0,0.5\n3.0,0.75\n");
        let rows = read_raw_rows(f.path()).unwrap();
        assert_eq!(rows.skipped, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.numeric_column(1).unwrap(), vec![-0.5, 0.5, 0.75]);
        assert!(matches!(rows.numeric_column(2), Err(AppError::MissingColumn { .. })));
    }

    #[test]
    fn representation_requires_its_columns() {
        let table = Table::from_columns("t", vec![(COL_IFFT_REAL, vec![1.0, 2.0])]).unwrap();
        assert!(matches!(
            table.representation(RepresentationKind::Real).unwrap(),
            SignalRepresentation::RealOnly(_)
        ));
        assert!(matches!(
            table.representation(RepresentationKind::Complex),
            Err(AppError::InvalidRepresentation { .. })
        ));
    }

    #[test]
    fn columns_mut_rejects_unknown_names() {
        let mut table = Table::from_columns("t", vec![("a", vec![1.0]), ("b", vec![2.0])]).unwrap();
        assert_eq!(table.columns_mut(&["b"]).unwrap().len(), 1);
        assert!(table.columns_mut(&["a", "zz"]).is_err());
    }

    #[test]
    fn from_columns_checks_lengths() {
        assert!(Table::from_columns("t", vec![("a", vec![1.0]), ("b", vec![])]).is_err());
    }
}
