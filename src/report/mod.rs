//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the signal/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::StageOutput;
use crate::domain::PhaseFitFile;

/// Format a phase fit (coefficients + diagnostics).
pub fn format_fit_summary(file: &PhaseFitFile) -> String {
    let fit = &file.fit;
    let mut out = String::new();

    out.push_str("=== Phase fit ===\n");
    out.push_str(&format!("Source: {}\n", file.source));
    out.push_str(&format!("Columns: x={} | y={}\n", file.x_column, file.y_column));
    out.push_str(&format!("Range: [{:.2}, {:.2}] | n={}\n", fit.x_min, fit.x_max, fit.quality.n));

    out.push_str("\nCoefficients:\n");
    out.push_str(&format!("  beta0 = {:>14.6}\n", fit.model.beta0));
    out.push_str(&format!("  beta1 = {:>14.6}  (group delay)\n", fit.model.beta1));
    out.push_str(&format!("  beta2 = {:>14.6}  (dispersion)\n", fit.model.beta2));
    out.push_str(&format!("  w0    = {:>14.6}  (center)\n", fit.model.w0));

    out.push_str("\nQuality:\n");
    out.push_str(&format!("  SSE  = {:.6e}\n", fit.quality.sse));
    out.push_str(&format!("  RMSE = {:.6e}\n", fit.quality.rmse));

    out
}

/// One line per written stage output.
pub fn format_stage_outputs(stages: &[StageOutput]) -> String {
    let width = stages.iter().map(|s| s.stage.len()).max().unwrap_or(0);
    stages
        .iter()
        .map(|s| format!("{:<width$}  {} ({} rows)\n", s.stage, s.path.display(), s.rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{FitGrid, FitQuality, PhaseFitModel, PhaseFitResult};

    #[test]
    fn fit_summary_lists_coefficients() {
        let file = PhaseFitFile {
            tool: "zc-spectral".to_string(),
            source: "run_fft.csv".to_string(),
            x_column: "FFT Bin".to_string(),
            y_column: "Phase".to_string(),
            fit: PhaseFitResult {
                model: PhaseFitModel {
                    beta0: 2.0,
                    beta1: 3.0,
                    beta2: 4.0,
                    w0: 5.0,
                },
                quality: FitQuality {
                    sse: 0.0,
                    rmse: 0.0,
                    n: 11,
                },
                x_min: 0.0,
                x_max: 10.0,
            },
            grid: FitGrid {
                x: Vec::new(),
                phase: Vec::new(),
            },
        };

        let text = format_fit_summary(&file);
        assert!(text.contains("beta1 =       3.000000"), "{text}");
        assert!(text.contains("w0    =       5.000000"), "{text}");
        assert!(text.contains("n=11"));
    }

    #[test]
    fn stage_lines_are_aligned() {
        let stages = vec![
            StageOutput {
                stage: "ifft",
                path: PathBuf::from("a_ifft.csv"),
                rows: 4,
            },
            StageOutput {
                stage: "zero-crossing",
                path: PathBuf::from("a_zc.csv"),
                rows: 4,
            },
        ];
        let text = format_stage_outputs(&stages);
        assert_eq!(text.lines().next(), Some("ifft           a_ifft.csv (4 rows)"));
    }
}
