//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - handed by value from one pipeline stage to the next
//! - exported to CSV/JSON
//! - reloaded later (fit JSON) for reporting

use std::f64::consts::PI;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

// Column names are load-bearing: every downstream stage looks columns up by name.
pub const COL_INDEX: &str = "Index";
pub const COL_INTERP_MEASUREMENT: &str = "Interpolated Measurement";
pub const COL_INTERP_REFERENCE: &str = "Interpolated Reference";
pub const COL_ORIGINAL_INDEX: &str = "Original Index";
pub const COL_INTERP_ARRAY_INDEX: &str = "Interpolated Array Index";
pub const COL_MEASUREMENT_AT_ZC: &str = "Measurement at Zero-Crossing";
pub const COL_IFFT_REAL: &str = "IFFT Real";
pub const COL_IFFT_IMAG: &str = "IFFT Imag";
pub const COL_IFFT_MAGNITUDE: &str = "IFFT Magnitude";
pub const COL_FFT_BIN: &str = "FFT Bin";
pub const COL_POWER: &str = "Power";
pub const COL_PHASE: &str = "Phase";

/// Default number of decimal digits kept in persisted numeric output.
pub const DEFAULT_PRECISION: u32 = 6;

/// Raw series upsampled onto a finer, shared index grid.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedSeries {
    /// Fractional index of each sample in original-sample units.
    pub index: Vec<f64>,
    pub reference: Vec<f64>,
    pub measurement: Vec<f64>,
}

impl InterpolatedSeries {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// One detected sign change of the reference signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZeroCrossing {
    /// Coordinate of the refined sample taken from the index array.
    pub original_index: f64,
    /// Position of the refined sample in the array that was scanned.
    pub interpolated_array_index: usize,
    /// Measurement value at the refined sample.
    pub measurement_value: f64,
}

/// Output of a forward transform, in native (unshifted) bin order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSpectrum {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl ComplexSpectrum {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    pub fn magnitude(&self) -> Vec<f64> {
        magnitudes(&self.real, &self.imag)
    }

    /// Power as persisted by the forward stage (the bin magnitude).
    pub fn power(&self) -> Vec<f64> {
        self.magnitude()
    }

    /// Principal-value phase in `(-π, π]`.
    pub fn phase(&self) -> Vec<f64> {
        self.real
            .iter()
            .zip(&self.imag)
            .map(|(&re, &im)| principal_phase(re, im))
            .collect()
    }
}

/// Output of an inverse transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSignal {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl ComplexSignal {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    pub fn magnitude(&self) -> Vec<f64> {
        magnitudes(&self.real, &self.imag)
    }
}

fn magnitudes(real: &[f64], imag: &[f64]) -> Vec<f64> {
    real.iter().zip(imag).map(|(&re, &im)| re.hypot(im)).collect()
}

fn principal_phase(re: f64, im: f64) -> f64 {
    let p = im.atan2(re);
    // atan2 can return exactly -π for a negative real axis with signed zero.
    if p <= -PI { PI } else { p }
}

/// Which persisted columns a transform input is rebuilt from.
///
/// This is the boundary-side selector; `SignalRepresentation` carries the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RepresentationKind {
    /// Real + imaginary columns (exact).
    Complex,
    /// Real column only, imaginary part zero-filled.
    Real,
    /// Imaginary column only, real part zero-filled.
    Imag,
    /// Magnitude column only; phase is discarded (shape inspection only).
    Magnitude,
}

impl RepresentationKind {
    pub fn display_name(self) -> &'static str {
        match self {
            RepresentationKind::Complex => "complex",
            RepresentationKind::Real => "real-only",
            RepresentationKind::Imag => "imag-only",
            RepresentationKind::Magnitude => "magnitude-only",
        }
    }
}

/// How a persisted series is reconstructed before transforming.
///
/// Only `Complex` is exact. `RealOnly` and `ImagOnly` zero-fill the missing
/// component. `MagnitudeOnly` has no phase at all, so anything computed from
/// it reflects the magnitude envelope only and must not be treated as a
/// reconstruction of the original signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalRepresentation {
    Complex { real: Vec<f64>, imag: Vec<f64> },
    RealOnly(Vec<f64>),
    ImagOnly(Vec<f64>),
    MagnitudeOnly(Vec<f64>),
}

impl SignalRepresentation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            SignalRepresentation::Complex { .. } => RepresentationKind::Complex,
            SignalRepresentation::RealOnly(_) => RepresentationKind::Real,
            SignalRepresentation::ImagOnly(_) => RepresentationKind::Imag,
            SignalRepresentation::MagnitudeOnly(_) => RepresentationKind::Magnitude,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SignalRepresentation::Complex { real, .. } => real.len(),
            SignalRepresentation::RealOnly(v)
            | SignalRepresentation::ImagOnly(v)
            | SignalRepresentation::MagnitudeOnly(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_lossy(&self) -> bool {
        !matches!(self, SignalRepresentation::Complex { .. })
    }
}

/// Inclusive index range over an array of length `n`, possibly wrapping.
///
/// `start <= end` covers `[start, end]`; `start > end` covers
/// `[0, end] ∪ [start, n-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexWindow {
    pub start: usize,
    pub end: usize,
}

impl IndexWindow {
    /// Build a window, checking both bounds against `n`.
    pub fn new(start: usize, end: usize, n: usize) -> Result<Self> {
        if start >= n || end >= n {
            return Err(AppError::InvalidSelection(format!(
                "window ({start}, {end}) out of range for {n} samples (valid: 0..={})",
                n.saturating_sub(1)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn is_wrapping(&self) -> bool {
        self.start > self.end
    }

    /// Number of samples covered in an array of length `n`.
    pub fn covered(&self, n: usize) -> usize {
        if self.is_wrapping() {
            (self.end + 1) + (n - self.start)
        } else {
            self.end - self.start + 1
        }
    }

    pub fn contains(&self, i: usize) -> bool {
        if self.is_wrapping() {
            i <= self.end || i >= self.start
        } else {
            (self.start..=self.end).contains(&i)
        }
    }
}

/// Index space in which window edges are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionSpace {
    /// Shifted when the input carries inverse-transform columns, native otherwise.
    Auto,
    /// Edges are positions in the zero-centered (shifted) ordering.
    Shifted,
    /// Edges are native array indices.
    Native,
}

/// Quadratic (2nd-order Taylor) phase model around `w0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseFitModel {
    pub beta0: f64,
    /// Local group delay.
    pub beta1: f64,
    /// Dispersion (curvature).
    pub beta2: f64,
    /// Mean of the fitted x-values; fixed, not estimated.
    pub w0: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Full output of a phase fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseFitResult {
    pub model: PhaseFitModel,
    pub quality: FitQuality,
    pub x_min: f64,
    pub x_max: f64,
}

/// A saved phase fit (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseFitFile {
    pub tool: String,
    pub source: String,
    pub x_column: String,
    pub y_column: String,
    pub fit: PhaseFitResult,
    /// Model evaluated across the fit range, for quick plotting.
    pub grid: FitGrid,
}

/// Fitted phase sampled on an evenly spaced x grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub x: Vec<f64>,
    pub phase: Vec<f64>,
}

/// Persistence settings shared by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Decimal digits kept when writing numeric values.
    pub precision: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}
