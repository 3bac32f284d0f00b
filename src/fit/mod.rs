//! Phase curve fitting.
//!
//! Responsibilities:
//!
//! - unwrap principal-value phase and cut the requested x-range
//! - fit the quadratic Taylor model with a fixed expansion point
//! - report fit diagnostics

pub mod phase;

pub use phase::*;
