//! Cubic spline interpolation on a uniform integer grid.
//!
//! Knots are `x_i = i` for `i = 0..n`, which is all the interpolator needs
//! (samples are addressed by their index). The spline is C² and uses the
//! not-a-knot end condition: the third derivative is continuous across the
//! second and the second-to-last knot, so the first two and the last two
//! segments are each a single cubic.
//!
//! The spline is stored in Hermite form: values `y_i` plus knot slopes `s_i`,
//! obtained from a tridiagonal system.
//!
//! Numerical notes:
//! - With unit spacing the not-a-knot rows are not diagonally dominant, but the
//!   elimination pivots stay bounded away from zero (they converge to
//!   `2 + √3` in the interior and the last one stays above `0.4`), so the plain
//!   Thomas algorithm is stable here.
//! - Evaluating exactly at a knot returns the stored sample, so upsampling by a
//!   factor of one reproduces the input bit-for-bit.

use crate::error::{AppError, Result};

/// Fewest samples for which a not-a-knot cubic is defined.
pub const MIN_SPLINE_POINTS: usize = 4;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    y: Vec<f64>,
    slopes: Vec<f64>,
}

impl CubicSpline {
    /// Fit a spline through `y` at knots `0, 1, ..., n-1`.
    pub fn fit(y: &[f64]) -> Result<Self> {
        let n = y.len();
        if n < MIN_SPLINE_POINTS {
            return Err(AppError::insufficient("cubic interpolation", MIN_SPLINE_POINTS, n));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(AppError::InvalidInput(
                "cubic interpolation input contains non-finite samples".to_string(),
            ));
        }

        // Secant slopes of each unit-width segment.
        let d: Vec<f64> = y.windows(2).map(|w| w[1] - w[0]).collect();

        let mut lower = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut upper = vec![0.0; n];
        let mut rhs = vec![0.0; n];

        // Not-a-knot at the start (h0 = h1 = 1, x2 - x0 = 2).
        diag[0] = 1.0;
        upper[0] = 2.0;
        rhs[0] = (5.0 * d[0] + d[1]) / 2.0;

        // Interior continuity of the second derivative.
        for i in 1..n - 1 {
            lower[i] = 1.0;
            diag[i] = 4.0;
            upper[i] = 1.0;
            rhs[i] = 3.0 * (d[i - 1] + d[i]);
        }

        // Not-a-knot at the end.
        lower[n - 1] = 2.0;
        diag[n - 1] = 1.0;
        rhs[n - 1] = (d[n - 3] + 5.0 * d[n - 2]) / 2.0;

        let slopes = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
        Ok(Self { y: y.to_vec(), slopes })
    }

    /// Largest valid evaluation coordinate (`n - 1`).
    pub fn x_max(&self) -> f64 {
        (self.y.len() - 1) as f64
    }

    /// Evaluate at `x ∈ [0, n-1]`. Outside that range the spline is not
    /// defined and an error is returned (no extrapolation).
    pub fn eval(&self, x: f64) -> Result<f64> {
        let x_max = self.x_max();
        if !(0.0..=x_max).contains(&x) {
            return Err(AppError::InvalidInput(format!(
                "interpolation point {x} outside [0, {x_max}]"
            )));
        }

        let last = self.y.len() - 1;
        if x == x_max {
            return Ok(self.y[last]);
        }

        let i = (x.floor() as usize).min(last - 1);
        let t = x - i as f64;
        if t == 0.0 {
            return Ok(self.y[i]);
        }

        let y0 = self.y[i];
        let secant = self.y[i + 1] - y0;
        let s0 = self.slopes[i];
        let s1 = self.slopes[i + 1];

        let c3 = s0 + s1 - 2.0 * secant;
        let c2 = secant - s0 - c3;
        Ok(((c3 * t + c2) * t + s0) * t + y0)
    }
}

/// Solve a tridiagonal system with the Thomas algorithm.
///
/// `lower[0]` and `upper[n-1]` are ignored.
pub fn solve_tridiagonal(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = diag.len();
    if n == 0 || lower.len() != n || upper.len() != n || rhs.len() != n {
        return Err(AppError::Numerical("malformed tridiagonal system".to_string()));
    }

    let mut c = vec![0.0; n];
    let mut r = vec![0.0; n];

    let mut pivot = diag[0];
    if pivot.abs() < 1e-300 {
        return Err(AppError::Numerical("singular tridiagonal system".to_string()));
    }
    c[0] = upper[0] / pivot;
    r[0] = rhs[0] / pivot;

    for i in 1..n {
        pivot = diag[i] - lower[i] * c[i - 1];
        if pivot.abs() < 1e-300 {
            return Err(AppError::Numerical("singular tridiagonal system".to_string()));
        }
        c[i] = if i + 1 < n { upper[i] / pivot } else { 0.0 };
        r[i] = (rhs[i] - lower[i] * r[i - 1]) / pivot;
    }

    let mut x = r;
    for i in (0..n - 1).rev() {
        x[i] -= c[i] * x[i + 1];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproduces_cubic_polynomials_exactly() {
        // Not-a-knot splines are exact for cubics.
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 3.0;
        let y: Vec<f64> = (0..8).map(|i| f(i as f64)).collect();
        let spline = CubicSpline::fit(&y).unwrap();
        for k in 0..=70 {
            let x = k as f64 / 10.0;
            let got = spline.eval(x).unwrap();
            assert!((got - f(x)).abs() < 1e-9, "x={x}: {got} vs {}", f(x));
        }
    }

    #[test]
    fn four_points_give_the_interpolating_cubic() {
        let f = |x: f64| x * x * x - x;
        let y: Vec<f64> = (0..4).map(|i| f(i as f64)).collect();
        let spline = CubicSpline::fit(&y).unwrap();
        assert!((spline.eval(1.5).unwrap() - f(1.5)).abs() < 1e-12);
        assert!((spline.eval(2.25).unwrap() - f(2.25)).abs() < 1e-12);
    }

    #[test]
    fn knots_are_returned_exactly() {
        let y = [0.3, -1.7, 2.2, 5.0, 4.1];
        let spline = CubicSpline::fit(&y).unwrap();
        for (i, &v) in y.iter().enumerate() {
            assert_eq!(spline.eval(i as f64).unwrap(), v);
        }
    }

    #[test]
    fn rejects_short_input_and_extrapolation() {
        assert!(matches!(
            CubicSpline::fit(&[1.0, 2.0, 3.0]),
            Err(AppError::InsufficientData { required: 4, found: 3, .. })
        ));
        let spline = CubicSpline::fit(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(spline.eval(3.0001).is_err());
        assert!(spline.eval(-0.1).is_err());
    }

    #[test]
    fn tridiagonal_solver_matches_known_solution() {
        // [2 1 0; 1 2 1; 0 1 2] x = [4 8 8] -> x = [1 2 3]
        let x = solve_tridiagonal(&[0.0, 1.0, 1.0], &[2.0, 2.0, 2.0], &[1.0, 1.0, 0.0], &[4.0, 8.0, 8.0])
            .unwrap();
        for (got, want) in x.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }
}
