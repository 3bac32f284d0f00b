//! Quadratic fit of unwrapped spectral phase.
//!
//! Given x-values (bins or frequencies) and principal-value phase:
//!
//! 1. keep samples with `x_min <= x <= x_max`
//! 2. unwrap the kept (still wrapped) samples
//! 3. fix `w0` to the mean of the kept x-values
//! 4. solve the (linear) least squares problem for `β0, β1, β2`
//!
//! Unwrapping starts from the first kept sample, which stays in `(-π, π]`.
//! `β0` is therefore relative to that wrapped start and can differ by a
//! multiple of 2π from the value obtained by unwrapping the whole series
//! first (`unwrap_phase` over everything, as a plot of the full phase would).
//! `β1` and `β2` are unaffected.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{FitQuality, PhaseFitModel, PhaseFitResult};
use crate::error::{AppError, Result};
use crate::math::{solve_least_squares, unwrap_phase};
use crate::models::{BETA_LEN, design_row, predict};

/// Fewest samples that determine the three coefficients.
pub const MIN_FIT_POINTS: usize = BETA_LEN;

/// Window, unwrap and fit phase over `[x_min, x_max]` (edges in any order).
pub fn fit_phase(x: &[f64], phase: &[f64], x_min: f64, x_max: f64) -> Result<PhaseFitResult> {
    if x.len() != phase.len() {
        return Err(AppError::InvalidInput(format!(
            "x has {} values but phase has {}",
            x.len(),
            phase.len()
        )));
    }
    if !(x_min.is_finite() && x_max.is_finite()) {
        return Err(AppError::InvalidSelection(
            "fit range edges must be finite".to_string(),
        ));
    }
    let (lo, hi) = (x_min.min(x_max), x_min.max(x_max));

    let (xs, wrapped): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(phase)
        .filter(|(xi, _)| (lo..=hi).contains(*xi))
        .map(|(&xi, &yi)| (xi, yi))
        .unzip();
    let ys = unwrap_phase(&wrapped);

    debug!(total = x.len(), selected = xs.len(), x_min = lo, x_max = hi, "phase fit window");

    let (model, quality) = fit_quadratic(&xs, &ys)?;
    Ok(PhaseFitResult {
        model,
        quality,
        x_min: lo,
        x_max: hi,
    })
}

/// Least squares fit of the quadratic Taylor model, `w0 = mean(x)`.
pub fn fit_quadratic(x: &[f64], y: &[f64]) -> Result<(PhaseFitModel, FitQuality)> {
    let n = x.len();
    if n != y.len() {
        return Err(AppError::InvalidInput(format!(
            "x has {n} values but y has {}",
            y.len()
        )));
    }
    if n < MIN_FIT_POINTS {
        return Err(AppError::insufficient("phase fit window", MIN_FIT_POINTS, n));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(AppError::InvalidInput(
            "phase fit input contains non-finite values".to_string(),
        ));
    }

    let w0 = x.iter().sum::<f64>() / n as f64;

    let mut design = DMatrix::<f64>::zeros(n, BETA_LEN);
    for (i, &xi) in x.iter().enumerate() {
        for (j, v) in design_row(xi, w0).into_iter().enumerate() {
            design[(i, j)] = v;
        }
    }
    let obs = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &obs)?;
    let model = PhaseFitModel {
        beta0: beta[0],
        beta1: beta[1],
        beta2: beta[2],
        w0,
    };

    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - predict(&model, xi);
            r * r
        })
        .sum();
    if !sse.is_finite() {
        return Err(AppError::Numerical("non-finite residuals in phase fit".to_string()));
    }

    let quality = FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        n,
    };
    Ok((model, quality))
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{PI, TAU};

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    use super::*;

    fn wrap(v: f64) -> f64 {
        (v + PI).rem_euclid(TAU) - PI
    }

    #[test]
    fn recovers_taylor_coefficients() {
        let x: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&xi| 2.0 + 3.0 * (xi - 5.0) + 2.0 * (xi - 5.0).powi(2))
            .collect();

        let (model, quality) = fit_quadratic(&x, &y).unwrap();
        assert!((model.beta0 - 2.0).abs() < 1e-4, "beta0 = {}", model.beta0);
        assert!((model.beta1 - 3.0).abs() < 1e-4, "beta1 = {}", model.beta1);
        assert!((model.beta2 - 4.0).abs() < 1e-4, "beta2 = {}", model.beta2);
        assert!((model.w0 - 5.0).abs() < 1e-4);
        assert!(quality.sse < 1e-12);
        assert_eq!(quality.n, 11);
    }

    #[test]
    fn fits_wrapped_phase_inside_a_window() {
        // Gentle quadratic phase, wrapped into (-π, π].
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let truth = |w: f64| 0.5 + 0.2 * (w - 120.0) + 0.5 * 0.004 * (w - 120.0).powi(2);
        let phase: Vec<f64> = x.iter().map(|&w| wrap(truth(w))).collect();

        let fit = fit_phase(&x, &phase, 140.0, 100.0).unwrap();
        assert_eq!(fit.x_min, 100.0);
        assert_eq!(fit.x_max, 140.0);
        assert_eq!(fit.quality.n, 41);
        assert!((fit.model.w0 - 120.0).abs() < 1e-12);
        assert!((fit.model.beta1 - 0.2).abs() < 1e-6);
        assert!((fit.model.beta2 - 0.004).abs() < 1e-8);

        // Unwrapping starts at the wrapped value of bin 100: truth(100) = -2.7
        // already lies in (-π, π], so the window reproduces the truth exactly.
        assert!((fit.model.beta0 - 0.5).abs() < 1e-6, "beta0 = {}", fit.model.beta0);
    }

    #[test]
    fn beta0_follows_the_wrapped_start_of_the_window() {
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let truth = |w: f64| 0.5 + 0.2 * (w - 120.0) + 0.5 * 0.004 * (w - 120.0).powi(2);
        let phase: Vec<f64> = x.iter().map(|&w| wrap(truth(w))).collect();

        // Unwrapping the whole series first lands the window 2π lower.
        let whole = unwrap_phase(&phase);
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(&whole)
            .filter(|(xi, _)| (100.0..=140.0).contains(*xi))
            .map(|(&xi, &yi)| (xi, yi))
            .unzip();
        let (from_whole, _) = fit_quadratic(&xs, &ys).unwrap();

        let fit = fit_phase(&x, &phase, 100.0, 140.0).unwrap();
        assert!((fit.model.beta0 - 0.5).abs() < 1e-6, "beta0 = {}", fit.model.beta0);
        assert!((fit.model.beta0 - from_whole.beta0 - TAU).abs() < 1e-6);
        assert!((fit.model.beta1 - from_whole.beta1).abs() < 1e-9);
    }

    #[test]
    fn noisy_phase_stays_close() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = Normal::new(0.0, 0.01).unwrap();
        let x: Vec<f64> = (0..400).map(|i| i as f64 * 0.05).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&w| -1.0 + 0.8 * (w - 10.0) + 0.5 * 0.3 * (w - 10.0).powi(2) + noise.sample(&mut rng))
            .collect();

        let (model, quality) = fit_quadratic(&x, &y).unwrap();
        assert!((model.beta1 - 0.8).abs() < 0.01);
        assert!((model.beta2 - 0.3).abs() < 0.01);
        assert!(quality.rmse < 0.02);
    }

    #[test]
    fn window_with_too_few_points() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let phase = [0.0; 5];
        let err = fit_phase(&x, &phase, 1.5, 3.0).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { required: 3, found: 2, .. }));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(matches!(
            fit_phase(&[0.0, 1.0], &[0.0], 0.0, 1.0),
            Err(AppError::InvalidInput(_))
        ));
    }
}
