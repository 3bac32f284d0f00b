//! Mathematical utilities: cubic splines, phase unwrapping and least squares.

pub mod ols;
pub mod spline;
pub mod unwrap;

pub use ols::*;
pub use spline::*;
pub use unwrap::*;
