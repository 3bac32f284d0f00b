//! Phase unwrapping.

use std::f64::consts::{PI, TAU};

/// Remove artificial ±2π jumps from a phase sequence.
///
/// Whenever two consecutive samples differ by more than π, the remainder of the
/// sequence is shifted by the multiple of 2π that brings the difference back
/// into `[-π, π]`. A jump of exactly +π is kept as +π (not folded to -π). The
/// first sample is never modified.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for w in phase.windows(2) {
        let dd = w[1] - w[0];
        if dd.abs() >= PI {
            let mut ddmod = (dd + PI).rem_euclid(TAU) - PI;
            if ddmod == -PI && dd > 0.0 {
                ddmod = PI;
            }
            correction += ddmod - dd;
        }
        out.push(w[1] + correction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_a_linear_ramp() {
        let truth: Vec<f64> = (0..50).map(|i| 0.4 * i as f64).collect();
        let wrapped: Vec<f64> = truth.iter().map(|&p| (p + PI).rem_euclid(TAU) - PI).collect();
        let unwrapped = unwrap_phase(&wrapped);
        for (u, t) in unwrapped.iter().zip(&truth) {
            assert!((u - t).abs() < 1e-9, "{u} vs {t}");
        }
    }

    #[test]
    fn small_steps_are_untouched() {
        let phase = [0.0, 1.0, 2.0, 3.0, 2.5];
        assert_eq!(unwrap_phase(&phase), phase.to_vec());
    }

    #[test]
    fn negative_jump_is_corrected() {
        let out = unwrap_phase(&[3.0, -3.0]);
        assert!((out[1] - (TAU - 3.0)).abs() < 1e-12);
    }

    #[test]
    fn empty_and_single() {
        assert!(unwrap_phase(&[]).is_empty());
        assert_eq!(unwrap_phase(&[1.5]), vec![1.5]);
    }
}
