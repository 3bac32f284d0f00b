//! Phase model implementation.
//!
//! Kept as small, pure functions so the fitting code stays independent of how
//! the model is written down.

pub mod model;

pub use model::*;
