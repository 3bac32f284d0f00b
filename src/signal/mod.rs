//! Signal processing stages.
//!
//! Leaf-first: cubic upsampling (`interpolate`), sign-change detection
//! (`zero_crossing`), DFTs (`transform`) and index-window masking (`window`).
//! Every function here works on in-memory arrays; file handling lives in `io`.

pub mod interpolate;
pub mod transform;
pub mod window;
pub mod zero_crossing;

pub use interpolate::interpolate;
pub use transform::{SpectralTransformer, reconstruct};
pub use zero_crossing::extract;
