//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - stage data (`InterpolatedSeries`, `ZeroCrossing`, `ComplexSpectrum`, ...)
//! - the typed transform input (`SignalRepresentation`)
//! - index windows and the edge selection state machine
//! - fit outputs (`PhaseFitModel`, `PhaseFitResult`, ...)

pub mod selection;
pub mod types;

pub use selection::*;
pub use types::*;
