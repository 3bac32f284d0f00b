//! Index-window masking with circular wraparound.
//!
//! Two index spaces are involved:
//!
//! - **native**: bin order as produced by the transforms; masks are always
//!   built and applied here.
//! - **shifted**: the same samples rotated so the zero-frequency bin sits in
//!   the middle. Users pick edges in this space when looking at a centered
//!   spectrum, so their picks must be translated back before masking.
//!
//! The rotation moves native index `i` to position `(i + ⌊N/2⌋) mod N`. Its
//! inverse therefore adds `⌈N/2⌉`; for even `N` both offsets are `N/2` and the
//! map is its own inverse.
//!
//! A contiguous run in shifted space that straddles the rotation seam maps to a
//! wrapping native window (`start > end`), which is why windows may wrap.

use tracing::debug;

use crate::domain::IndexWindow;
use crate::error::{AppError, Result};

/// Position of native index `i` after centering the zero-frequency bin.
pub fn shift(i: usize, n: usize) -> usize {
    (i + n / 2) % n
}

/// Native index of the sample shown at shifted position `k`.
pub fn unshift(k: usize, n: usize) -> usize {
    (k + n.div_ceil(2)) % n
}

/// Native window from two edge picks made in native order.
pub fn native_window(left: usize, right: usize, n: usize) -> Result<IndexWindow> {
    IndexWindow::new(left.min(right), left.max(right), n)
}

/// Native window from two edge picks made in shifted order.
///
/// The picks are sorted in shifted space and each edge is translated
/// separately, so the result wraps when the selection spans the seam.
pub fn shifted_window(left: usize, right: usize, n: usize) -> Result<IndexWindow> {
    let (lo, hi) = (left.min(right), left.max(right));
    if hi >= n {
        return Err(AppError::InvalidSelection(format!(
            "shifted edge {hi} out of range for {n} samples"
        )));
    }
    IndexWindow::new(unshift(lo, n), unshift(hi, n), n)
}

/// Union of windows as a boolean mask over `n` samples.
pub fn build_mask(windows: &[IndexWindow], n: usize) -> Result<Vec<bool>> {
    if let Some(w) = windows.iter().find(|w| w.start >= n || w.end >= n) {
        return Err(AppError::InvalidSelection(format!(
            "window ({}, {}) out of range for {n} samples",
            w.start, w.end
        )));
    }
    Ok((0..n).map(|i| windows.iter().any(|w| w.contains(i))).collect())
}

/// Zero every value whose mask entry is false.
pub fn apply_mask(values: &mut [f64], mask: &[bool]) -> Result<()> {
    if values.len() != mask.len() {
        return Err(AppError::InvalidInput(format!(
            "mask covers {} samples but the series has {}",
            mask.len(),
            values.len()
        )));
    }
    for (v, &keep) in values.iter_mut().zip(mask) {
        if !keep {
            *v = 0.0;
        }
    }
    Ok(())
}

/// Mask several equally long columns with one set of windows.
///
/// Columns keep their length; no windows zeroes everything.
pub fn mask_columns(columns: &mut [&mut Vec<f64>], windows: &[IndexWindow]) -> Result<()> {
    let Some(n) = columns.first().map(|c| c.len()) else {
        return Ok(());
    };
    let mask = build_mask(windows, n)?;
    for column in columns.iter_mut() {
        apply_mask(column, &mask)?;
    }
    debug!(
        samples = n,
        windows = windows.len(),
        covered = windows.iter().map(|w| w.covered(n)).sum::<usize>(),
        kept = mask.iter().filter(|&&m| m).count(),
        "applied window mask"
    );
    Ok(())
}
