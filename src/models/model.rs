//! Quadratic Taylor model of spectral phase.
//!
//! ```text
//! φ(w) = β0 + β1·(w − w0) + ½·β2·(w − w0)²
//! ```
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given `w` (for least squares)
//! - predict `φ(w)` given the coefficients (for residuals and exports)

use crate::domain::PhaseFitModel;

/// Number of fitted coefficients (`β0`, `β1`, `β2`).
pub const BETA_LEN: usize = 3;

/// Design row `[1, (w − w0), ½(w − w0)²]`.
pub fn design_row(w: f64, w0: f64) -> [f64; BETA_LEN] {
    let dw = w - w0;
    [1.0, dw, 0.5 * dw * dw]
}

/// Evaluate the fitted model at `w`.
pub fn predict(model: &PhaseFitModel, w: f64) -> f64 {
    let dw = w - model.w0;
    model.beta0 + model.beta1 * dw + 0.5 * model.beta2 * dw * dw
}
