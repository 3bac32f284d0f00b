//! Zero-crossing extraction.
//!
//! A crossing is reported for every adjacent pair `(i, i+1)` of the reference
//! whose signs differ, using the sample of the pair that lies closer to zero
//! (ties go to `i`). Signs are three-valued (`-1`, `0`, `+1`), so a sample that
//! is exactly zero differs in sign from both neighbours and is reported by both
//! pairs around it. That double report is kept as-is; callers that need one
//! crossing per zero sample must deduplicate on `interpolated_array_index`.

use tracing::{debug, warn};

use crate::domain::ZeroCrossing;
use crate::error::{AppError, Result};

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Find sign changes of `reference` and sample `measurement`/`index` there.
pub fn extract(reference: &[f64], measurement: &[f64], index: &[f64]) -> Result<Vec<ZeroCrossing>> {
    let n = reference.len();
    if measurement.len() != n || index.len() != n {
        return Err(AppError::InvalidInput(format!(
            "zero-crossing inputs differ in length: reference {n}, measurement {}, index {}",
            measurement.len(),
            index.len()
        )));
    }

    let mut out = Vec::new();

    for i in 0..n.saturating_sub(1) {
        let (a, b) = (reference[i], reference[i + 1]);
        if sign(a) == sign(b) {
            continue;
        }

        let j = if a.abs() <= b.abs() { i } else { i + 1 };
        out.push(ZeroCrossing {
            original_index: index[j],
            interpolated_array_index: j,
            measurement_value: measurement[j],
        });
    }

    let zero_samples = reference.iter().filter(|&&v| v == 0.0).count();
    if zero_samples > 0 {
        warn!(
            zero_samples,
            "reference contains exact zeros; crossings next to them may be reported twice"
        );
    }
    debug!(samples = n, crossings = out.len(), "extracted zero crossings");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(crossings: &[ZeroCrossing]) -> Vec<usize> {
        crossings.iter().map(|c| c.interpolated_array_index).collect()
    }

    #[test]
    fn square_wave_tie_breaks_to_earlier_index() {
        let reference = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];
        let measurement: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let index: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();

        let zc = extract(&reference, &measurement, &index).unwrap();
        assert_eq!(positions(&zc), vec![1, 3, 5]);
        assert_eq!(zc[0].original_index, 0.5);
        assert_eq!(zc[1].measurement_value, 103.0);
        assert_eq!(zc[2].original_index, 2.5);
    }

    #[test]
    fn picks_neighbour_nearest_zero() {
        let reference = [-0.9, 0.1, 0.5, -0.2, -0.7];
        let index = [0.0, 1.0, 2.0, 3.0, 4.0];
        let zc = extract(&reference, &reference, &index).unwrap();
        assert_eq!(positions(&zc), vec![1, 3]);
        assert_eq!(zc[1].measurement_value, -0.2);
    }

    #[test]
    fn exact_zero_is_reported_by_both_pairs() {
        let reference = [-1.0, 0.0, 1.0];
        let index = [0.0, 1.0, 2.0];
        let zc = extract(&reference, &reference, &index).unwrap();
        assert_eq!(positions(&zc), vec![1, 1]);
    }

    #[test]
    fn original_indices_increase_for_monotonic_index() {
        let reference: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin()).collect();
        let index: Vec<f64> = (0..200).map(|i| i as f64 / 10.0).collect();
        let zc = extract(&reference, &reference, &index).unwrap();
        assert!(zc.len() > 5);
        assert!(zc.windows(2).all(|w| w[1].original_index > w[0].original_index));
    }

    #[test]
    fn degenerate_inputs() {
        assert!(extract(&[], &[], &[]).unwrap().is_empty());
        assert!(extract(&[1.0], &[1.0], &[0.0]).unwrap().is_empty());
        assert!(matches!(
            extract(&[1.0, -1.0], &[1.0], &[0.0, 1.0]),
            Err(AppError::InvalidInput(_))
        ));
    }
}
