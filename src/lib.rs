//! `zc-spectral` library crate.
//!
//! The binary (`zcs`) is a thin wrapper around this library so that:
//!
//! - every stage is testable without spawning processes
//! - the signal processing modules are reusable on in-memory arrays
//!
//! Pipeline, leaf-first: `signal::interpolate` → `signal::zero_crossing` →
//! `signal::transform` (inverse) → `signal::window` → `signal::transform`
//! (forward) → `fit::phase`.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod report;
pub mod signal;
