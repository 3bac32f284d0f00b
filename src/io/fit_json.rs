//! Read/write phase fit JSON files.
//!
//! A fit file is the portable record of one phase fit:
//! - the coefficients and quality diagnostics
//! - which input file and columns it came from
//! - the model sampled across the fit range
//!
//! The schema is defined by `domain::PhaseFitFile`.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::{FitGrid, PhaseFitFile, PhaseFitResult};
use crate::error::{AppError, Result};
use crate::models::predict;

/// Points in the exported grid.
pub const GRID_POINTS: usize = 101;

/// Assemble the JSON document for a fit.
pub fn fit_file(fit: &PhaseFitResult, source: &str, x_column: &str, y_column: &str) -> PhaseFitFile {
    PhaseFitFile {
        tool: env!("CARGO_PKG_NAME").to_string(),
        source: source.to_string(),
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        fit: fit.clone(),
        grid: build_grid(fit, GRID_POINTS),
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, file: &PhaseFitFile) -> Result<()> {
    let text = serde_json::to_string_pretty(file).map_err(|e| AppError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, text).map_err(|e| AppError::io(path, e))?;
    info!(path = %path.display(), "wrote fit JSON");
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<PhaseFitFile> {
    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| AppError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

fn build_grid(fit: &PhaseFitResult, n: usize) -> FitGrid {
    let n = n.max(2);
    let (x0, x1) = (fit.x_min, fit.x_max);

    let x: Vec<f64> = (0..n)
        .map(|i| x0 + (x1 - x0) * i as f64 / (n - 1) as f64)
        .collect();
    let phase = x.iter().map(|&w| predict(&fit.model, w)).collect();
    FitGrid { x, phase }
}
