//! Stage logic shared by the single-stage commands and `chain`.
//!
//! Each stage is split in two:
//!
//! - a pure `*_table` function turning in-memory input into an output table
//! - a `run_*` wrapper that reads the input file, calls it, and writes the
//!   output exactly once after everything succeeded
//!
//! Interactive choices (window edges, row ranges, fit ranges) come in through
//! an `EdgeSource`; a cancelled selection aborts the stage before any output is
//! written.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, info};

use crate::cli::picker::{EdgeBounds, EdgeSource, collect_selection, collect_selections};
use crate::domain::*;
use crate::error::{AppError, Result};
use crate::fit::fit_phase;
use crate::io::{
    RawRows, Table, derive_output_path, fit_file, read_raw_rows, read_table, write_fit_json,
    write_rows, write_table,
};
use crate::signal::window::{mask_columns, native_window, shift, shifted_window};
use crate::signal::{SpectralTransformer, extract, interpolate};

/// One written stage output.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    pub stage: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

/// How window edges are obtained and interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    /// Edge pairs given up front; when empty, `interactive_count` windows are
    /// picked through the edge source.
    pub edges: Vec<(f64, f64)>,
    pub interactive_count: usize,
    pub space: SelectionSpace,
}

/// Result of the fit stage.
#[derive(Debug, Clone)]
pub struct FitOutput {
    pub file: PhaseFitFile,
}

/// Result of `chain`: every stage output plus the final fit.
#[derive(Debug, Clone)]
pub struct ChainOutput {
    pub stages: Vec<StageOutput>,
    pub fit: FitOutput,
}

fn finish_table(stage: &'static str, path: PathBuf, table: &Table, config: OutputConfig) -> Result<StageOutput> {
    write_table(&path, table, config)?;
    info!(stage, path = %path.display(), rows = table.len(), "stage complete");
    Ok(StageOutput {
        stage,
        path,
        rows: table.len(),
    })
}

/// Convert an edge pick to a sample index (fractional picks round down).
pub fn edge_to_index(edge: f64, n: usize) -> Result<usize> {
    let floor = edge.floor();
    if !(floor >= 0.0 && floor < n as f64) {
        return Err(AppError::InvalidSelection(format!(
            "edge {edge} out of range for {n} samples (valid: 0..={})",
            n.saturating_sub(1)
        )));
    }
    Ok(floor as usize)
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// Upsample a raw capture (column 0 = measurement, column 1 = reference).
pub fn interpolate_rows(rows: &RawRows, factor: usize) -> Result<Table> {
    let measurement = rows.numeric_column(0)?;
    let reference = rows.numeric_column(1)?;
    let series = interpolate(&reference, &measurement, factor)?;

    Table::from_columns(
        rows.source.clone(),
        vec![
            (COL_INDEX, series.index),
            (COL_INTERP_MEASUREMENT, series.measurement),
            (COL_INTERP_REFERENCE, series.reference),
        ],
    )
}

pub fn run_interpolate(input: &Path, factor: usize, config: OutputConfig) -> Result<StageOutput> {
    let rows = read_raw_rows(input)?;
    let table = interpolate_rows(&rows, factor)?;
    let path = derive_output_path(input, &format!("_interp{factor}"));
    finish_table("interpolate", path, &table, config)
}

// ---------------------------------------------------------------------------
// Zero crossings
// ---------------------------------------------------------------------------

pub fn zero_crossing_table(table: &Table) -> Result<Table> {
    let crossings = extract(
        table.column(COL_INTERP_REFERENCE)?,
        table.column(COL_INTERP_MEASUREMENT)?,
        table.column(COL_INDEX)?,
    )?;

    let original: Vec<f64> = crossings.iter().map(|c| c.original_index).collect();
    let positions: Vec<f64> = crossings.iter().map(|c| c.interpolated_array_index as f64).collect();
    let values: Vec<f64> = crossings.iter().map(|c| c.measurement_value).collect();

    Table::from_columns(
        table.source.clone(),
        vec![
            (COL_ORIGINAL_INDEX, original),
            (COL_INTERP_ARRAY_INDEX, positions),
            (COL_MEASUREMENT_AT_ZC, values),
        ],
    )
}

pub fn run_zero_crossing(input: &Path, config: OutputConfig) -> Result<StageOutput> {
    let table = read_table(input)?;
    let out = zero_crossing_table(&table)?;
    finish_table("zero-crossing", derive_output_path(input, "_zc"), &out, config)
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Inverse transform of one column, treated as a real signal.
pub fn ifft_table(table: &Table, column: &str, transformer: &mut SpectralTransformer) -> Result<Table> {
    let real = table.column(column)?.to_vec();
    // Measured values are real, so the zero imaginary part is exact.
    let imag = vec![0.0; real.len()];
    let signal = transformer.inverse(SignalRepresentation::Complex { real, imag })?;
    let magnitude = signal.magnitude();

    Table::from_columns(
        table.source.clone(),
        vec![
            (COL_IFFT_REAL, signal.real),
            (COL_IFFT_IMAG, signal.imag),
            (COL_IFFT_MAGNITUDE, magnitude),
        ],
    )
}

pub fn run_ifft(input: &Path, column: &str, config: OutputConfig) -> Result<StageOutput> {
    let table = read_table(input)?;
    let mut transformer = SpectralTransformer::new();
    let out = ifft_table(&table, column, &mut transformer)?;
    finish_table("ifft", derive_output_path(input, "_ifft"), &out, config)
}

/// Forward transform of the inverse-transform columns selected by `kind`.
pub fn fft_table(table: &Table, kind: RepresentationKind, transformer: &mut SpectralTransformer) -> Result<Table> {
    let repr = table.representation(kind)?;
    let spectrum = transformer.forward(repr)?;
    let bins: Vec<f64> = (0..spectrum.len()).map(|k| k as f64).collect();

    Table::from_columns(
        table.source.clone(),
        vec![
            (COL_FFT_BIN, bins),
            (COL_POWER, spectrum.power()),
            (COL_PHASE, spectrum.phase()),
        ],
    )
}

pub fn run_fft(input: &Path, kind: RepresentationKind, config: OutputConfig) -> Result<StageOutput> {
    let table = read_table(input)?;
    let mut transformer = SpectralTransformer::new();
    let out = fft_table(&table, kind, &mut transformer)?;
    finish_table("fft", derive_output_path(input, "_fft"), &out, config)
}

// ---------------------------------------------------------------------------
// Window masking
// ---------------------------------------------------------------------------

/// Columns masked for this table, and the column edges are picked on.
fn window_columns(table: &Table, column: Option<&str>) -> Result<(Vec<&'static str>, Option<String>)> {
    if table.is_inverse_output() {
        return Ok((vec![COL_IFFT_REAL, COL_IFFT_IMAG, COL_IFFT_MAGNITUDE], None));
    }
    match column {
        Some(name) => {
            table.column(name)?;
            Ok((Vec::new(), Some(name.to_string())))
        }
        None => Err(AppError::InvalidInput(format!(
            "{}: not an inverse-transform table; pass --column (available: {})",
            table.source,
            table.headers.join(", ")
        ))),
    }
}

fn resolve_space(space: SelectionSpace, table: &Table) -> SelectionSpace {
    match space {
        SelectionSpace::Auto if table.is_inverse_output() => SelectionSpace::Shifted,
        SelectionSpace::Auto => SelectionSpace::Native,
        other => other,
    }
}

/// Translate edge pairs into native index windows.
pub fn plan_windows(edges: &[(f64, f64)], space: SelectionSpace, n: usize) -> Result<Vec<IndexWindow>> {
    edges
        .iter()
        .map(|&(l, r)| {
            let (l, r) = (edge_to_index(l, n)?, edge_to_index(r, n)?);
            match space {
                SelectionSpace::Shifted => shifted_window(l, r, n),
                SelectionSpace::Native | SelectionSpace::Auto => native_window(l, r, n),
            }
        })
        .collect()
}

/// Zero every masked column outside the planned windows.
pub fn window_table(
    mut table: Table,
    column: Option<&str>,
    plan: &WindowPlan,
    source: &mut dyn EdgeSource,
) -> Result<Table> {
    let n = table.len();
    let (fixed, named) = window_columns(&table, column)?;
    let space = resolve_space(plan.space, &table);

    let edges = if plan.edges.is_empty() {
        let layout = match space {
            SelectionSpace::Shifted if n > 0 => format!(
                "zero-centered positions (bin 0 at position {})",
                shift(0, n)
            ),
            _ => "native positions".to_string(),
        };
        source.announce(&format!("{n} samples, edges are {layout}."))?;
        collect_selections(source, "window", EdgeBounds::indices(n), plan.interactive_count)?
    } else {
        plan.edges.clone()
    };
    let windows = plan_windows(&edges, space, n)?;
    debug!(?windows, ?space, "planned windows");

    let names: Vec<&str> = match &named {
        Some(name) => vec![name.as_str()],
        None => fixed,
    };
    let mut columns = table.columns_mut(&names)?;
    mask_columns(&mut columns, &windows)?;
    Ok(table)
}

pub fn run_window(
    input: &Path,
    column: Option<&str>,
    plan: &WindowPlan,
    source: &mut dyn EdgeSource,
    config: OutputConfig,
) -> Result<StageOutput> {
    let table = read_table(input)?;
    let out = window_table(table, column, plan, source)?;
    finish_table("window", derive_output_path(input, "_zeroedout"), &out, config)
}

// ---------------------------------------------------------------------------
// Truncation
// ---------------------------------------------------------------------------

/// Rows `[start, end]` (inclusive, edges in any order) of a raw capture.
pub fn truncate_rows(rows: &RawRows, range: (f64, f64)) -> Result<Vec<StringRecord>> {
    let n = rows.len();
    let (a, b) = (edge_to_index(range.0, n)?, edge_to_index(range.1, n)?);
    let (start, end) = (a.min(b), a.max(b));
    Ok(rows.records[start..=end].to_vec())
}

pub fn run_truncate(input: &Path, range: Option<(f64, f64)>, source: &mut dyn EdgeSource) -> Result<StageOutput> {
    let rows = read_raw_rows(input)?;
    if rows.is_empty() {
        return Err(AppError::insufficient("truncation", 1, 0));
    }
    let range = match range {
        Some(r) => r,
        None => {
            source.announce(&format!("{} data rows.", rows.len()))?;
            collect_selection(source, "row range", EdgeBounds::indices(rows.len()))?
        }
    };

    let kept = truncate_rows(&rows, range)?;
    let path = derive_output_path(input, "_truncated");
    write_rows(&path, &kept)?;
    info!(stage = "truncate", path = %path.display(), rows = kept.len(), "stage complete");
    Ok(StageOutput {
        stage: "truncate",
        path,
        rows: kept.len(),
    })
}

// ---------------------------------------------------------------------------
// Phase fit
// ---------------------------------------------------------------------------

/// Fit settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitPlan {
    pub x_column: String,
    pub y_column: String,
    pub range: Option<(f64, f64)>,
    pub export: Option<PathBuf>,
}

impl FitPlan {
    pub fn new(range: Option<(f64, f64)>, export: Option<PathBuf>) -> Self {
        Self {
            x_column: COL_FFT_BIN.to_string(),
            y_column: COL_PHASE.to_string(),
            range,
            export,
        }
    }
}

pub fn fit_table(table: &Table, plan: &FitPlan, source: &mut dyn EdgeSource) -> Result<FitOutput> {
    let x = table.column(&plan.x_column)?;
    let y = table.column(&plan.y_column)?;

    let (x_min, x_max) = match plan.range {
        Some(r) => r,
        None => {
            let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !(lo.is_finite() && hi.is_finite()) {
                return Err(AppError::insufficient("phase fit", 1, 0));
            }
            collect_selection(source, "fit range", EdgeBounds::new(lo, hi))?
        }
    };

    let fit = fit_phase(x, y, x_min, x_max)?;
    info!(
        beta0 = fit.model.beta0,
        beta1 = fit.model.beta1,
        beta2 = fit.model.beta2,
        w0 = fit.model.w0,
        n = fit.quality.n,
        "phase fit complete"
    );
    Ok(FitOutput {
        file: fit_file(&fit, &table.source, &plan.x_column, &plan.y_column),
    })
}

/// Fit a table file; writes the JSON export when requested.
pub fn run_fit(input: &Path, plan: &FitPlan, source: &mut dyn EdgeSource) -> Result<FitOutput> {
    let table = read_table(input)?;
    let out = fit_table(&table, plan, source)?;
    if let Some(path) = &plan.export {
        write_fit_json(path, &out.file)?;
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Settings for a full run from raw capture to fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPlan {
    pub factor: usize,
    pub representation: RepresentationKind,
    pub windows: WindowPlan,
    pub fit: FitPlan,
}

/// Run every stage in order, each reading the previous stage's file.
///
/// Stage outputs are left on disk as they complete; a later failure does not
/// remove earlier outputs, but no stage ever leaves a partial file.
pub fn run_chain(
    input: &Path,
    plan: &ChainPlan,
    source: &mut dyn EdgeSource,
    config: OutputConfig,
) -> Result<ChainOutput> {
    let mut stages = Vec::with_capacity(5);

    let interp = run_interpolate(input, plan.factor, config)?;
    let zc = run_zero_crossing(&interp.path, config)?;
    let ifft = run_ifft(&zc.path, COL_MEASUREMENT_AT_ZC, config)?;
    let window = run_window(&ifft.path, None, &plan.windows, source, config)?;
    let fft = run_fft(&window.path, plan.representation, config)?;
    let fit = run_fit(&fft.path, &plan.fit, source)?;

    stages.extend([interp, zc, ifft, window, fft]);
    Ok(ChainOutput { stages, fit })
}
