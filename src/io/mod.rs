//! Input/output helpers.
//!
//! - CSV ingest for stage tables and raw captures (`table`)
//! - rounded CSV and verbatim row exports (`export`)
//! - phase fit JSON read/write (`fit_json`)

pub mod export;
pub mod fit_json;
pub mod table;

pub use export::*;
pub use fit_json::*;
pub use table::*;
