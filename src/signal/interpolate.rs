//! Cubic upsampling of a paired reference/measurement series.

use tracing::debug;

use crate::domain::InterpolatedSeries;
use crate::error::{AppError, Result};
use crate::math::CubicSpline;

/// Fine grid over `[0, n-1]` with spacing `1/factor`.
///
/// Points are computed as `k / factor` rather than by accumulating the step,
/// and the last point is pinned to `n - 1` so the endpoint is always present
/// and never overshoots. A grid whose point count does not fit in `usize` is
/// rejected.
pub fn upsampled_grid(n: usize, factor: usize) -> Result<Vec<f64>> {
    if n == 0 || factor == 0 {
        return Ok(Vec::new());
    }
    let last = (n - 1).checked_mul(factor).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "upsampling {n} samples by {factor} overflows the grid size"
        ))
    })?;
    let mut grid: Vec<f64> = (0..=last).map(|k| k as f64 / factor as f64).collect();
    if let Some(end) = grid.last_mut() {
        *end = (n - 1) as f64;
    }
    Ok(grid)
}

/// Upsample both arrays by `factor` with independent cubic splines.
///
/// Requires `reference.len() == measurement.len() >= 4` and `factor >= 1`.
/// With `factor == 1` the output samples equal the input samples.
pub fn interpolate(reference: &[f64], measurement: &[f64], factor: usize) -> Result<InterpolatedSeries> {
    if factor == 0 {
        return Err(AppError::InvalidInput(
            "interpolation factor must be a positive integer".to_string(),
        ));
    }
    if reference.len() != measurement.len() {
        return Err(AppError::InvalidInput(format!(
            "reference has {} samples but measurement has {}",
            reference.len(),
            measurement.len()
        )));
    }

    let ref_spline = CubicSpline::fit(reference)?;
    let meas_spline = CubicSpline::fit(measurement)?;

    let index = upsampled_grid(reference.len(), factor)?;
    let reference = index
        .iter()
        .map(|&x| ref_spline.eval(x))
        .collect::<Result<Vec<_>>>()?;
    let measurement = index
        .iter()
        .map(|&x| meas_spline.eval(x))
        .collect::<Result<Vec<_>>>()?;

    debug!(input = ref_spline.x_max() as usize + 1, output = index.len(), factor, "interpolated series");

    Ok(InterpolatedSeries {
        index,
        reference,
        measurement,
    })
}
