//! Ordinary least squares solver.
//!
//! The phase fit is linear in its coefficients once the expansion point `w0`
//! is fixed, so it reduces to:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with a tall design matrix (many bins, three columns). We solve it with SVD,
//! which handles the non-square system directly and degrades gracefully when
//! the columns are nearly collinear (e.g. a very narrow fit window).

use nalgebra::{DMatrix, DVector};

use crate::error::{AppError, Result};

/// Singular-value cutoffs tried in order, strictest first.
const TOLERANCES: [f64; 3] = [1e-12, 1e-10, 1e-8];

/// Solve `min ||X β - y||²` using SVD.
///
/// Fails if the design matrix has no rows, if shapes disagree, or if no
/// tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(AppError::Numerical("empty design matrix".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(AppError::Numerical(format!(
            "design matrix has {} rows but {} observations were given",
            x.nrows(),
            y.len()
        )));
    }

    let svd = x.clone().svd(true, true);
    for &tol in &TOLERANCES {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Ok(beta);
            }
        }
    }

    Err(AppError::Numerical(
        "least squares system is too ill-conditioned to solve".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_averages_overdetermined_noise() {
        // Constant model: the solution is the mean.
        let x = DMatrix::from_element(4, 1, 1.0);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0, 6.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let x = DMatrix::from_element(3, 1, 1.0);
        let y = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(matches!(solve_least_squares(&x, &y), Err(AppError::Numerical(_))));
    }
}
