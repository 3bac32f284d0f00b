//! Forward and inverse discrete Fourier transforms.
//!
//! Both directions keep the sample count (`N` in, `N` out) and use native bin
//! order: bin 0 is the zero-frequency term, bins `1..=N/2` are ascending
//! positive frequencies and the rest are the negative frequencies in
//! descending order. Centering for display is done separately
//! (`signal::window::shift`).
//!
//! Scaling follows the usual convention: the forward transform is
//! unnormalized and the inverse divides by `N`, so `inverse(forward(x)) == x`.
//!
//! Inputs are always rebuilt from a `SignalRepresentation` first; see
//! [`reconstruct`] for what each lossy variant produces.

use std::fmt;
use std::sync::Arc;

use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use tracing::{debug, warn};

use crate::domain::{ComplexSignal, ComplexSpectrum, SignalRepresentation};
use crate::error::{AppError, Result};

/// Rebuild a complex sequence from a persisted representation.
///
/// - `Complex`: exact.
/// - `RealOnly`: imaginary part zero-filled (partial information).
/// - `ImagOnly`: real part zero-filled (partial information).
/// - `MagnitudeOnly`: magnitudes used as a zero-phase real signal. All phase
///   information is gone, so the result only shows the envelope shape and is
///   not a reconstruction of the original signal.
pub fn reconstruct(repr: SignalRepresentation) -> Result<Vec<Complex64>> {
    let kind = repr.kind();
    debug!(
        representation = kind.display_name(),
        samples = repr.len(),
        lossy = repr.is_lossy(),
        "rebuilding complex input"
    );
    let samples = match repr {
        SignalRepresentation::Complex { real, imag } => {
            if real.len() != imag.len() {
                return Err(AppError::InvalidRepresentation {
                    representation: kind.display_name(),
                    reason: format!(
                        "real part has {} samples but imaginary part has {}",
                        real.len(),
                        imag.len()
                    ),
                });
            }
            real.into_iter()
                .zip(imag)
                .map(|(re, im)| Complex64::new(re, im))
                .collect()
        }
        SignalRepresentation::RealOnly(real) => {
            warn!("real-only input: imaginary part zero-filled, result is approximate");
            real.into_iter().map(|re| Complex64::new(re, 0.0)).collect()
        }
        SignalRepresentation::ImagOnly(imag) => {
            warn!("imag-only input: real part zero-filled, result is approximate");
            imag.into_iter().map(|im| Complex64::new(0.0, im)).collect()
        }
        SignalRepresentation::MagnitudeOnly(magnitude) => {
            warn!("magnitude-only input: phase discarded, result is for shape inspection only");
            magnitude.into_iter().map(|m| Complex64::new(m, 0.0)).collect()
        }
    };
    Ok(samples)
}

/// Transform planner shared across calls of any length.
pub struct SpectralTransformer {
    planner: FftPlanner<f64>,
}

impl fmt::Debug for SpectralTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralTransformer").finish_non_exhaustive()
    }
}

impl Default for SpectralTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTransformer {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Forward DFT of the reconstructed input.
    pub fn forward(&mut self, input: SignalRepresentation) -> Result<ComplexSpectrum> {
        ensure_non_empty(&input, "forward transform")?;
        let mut buffer = reconstruct(input)?;

        let fft = self.planner.plan_fft_forward(buffer.len());
        process(fft, &mut buffer);
        debug!(bins = buffer.len(), "forward transform");

        let (real, imag) = split(&buffer);
        Ok(ComplexSpectrum { real, imag })
    }

    /// Inverse DFT (scaled by `1/N`) of the reconstructed input.
    pub fn inverse(&mut self, input: SignalRepresentation) -> Result<ComplexSignal> {
        ensure_non_empty(&input, "inverse transform")?;
        let mut buffer = reconstruct(input)?;

        let n = buffer.len();
        let ifft = self.planner.plan_fft_inverse(n);
        process(ifft, &mut buffer);

        let scale = 1.0 / n as f64;
        for sample in buffer.iter_mut() {
            *sample *= scale;
        }
        debug!(samples = n, "inverse transform");

        let (real, imag) = split(&buffer);
        Ok(ComplexSignal { real, imag })
    }
}

fn ensure_non_empty(input: &SignalRepresentation, context: &str) -> Result<()> {
    if input.is_empty() {
        return Err(AppError::insufficient(context, 1, 0));
    }
    Ok(())
}

fn process(fft: Arc<dyn Fft<f64>>, buffer: &mut [Complex64]) {
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    fft.process_with_scratch(buffer, &mut scratch);
}

fn split(buffer: &[Complex64]) -> (Vec<f64>, Vec<f64>) {
    buffer.iter().map(|c| (c.re, c.im)).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signal(n: usize) -> (Vec<f64>, Vec<f64>) {
        let real = (0..n).map(|i| (i as f64 * 0.31).sin() + 0.1 * i as f64).collect();
        let imag = (0..n).map(|i| (i as f64 * 1.7).cos() - 0.5).collect();
        (real, imag)
    }

    #[test]
    fn round_trip_for_prime_power_of_two_and_composite_lengths() {
        let mut t = SpectralTransformer::new();
        for n in [1usize, 2, 7, 13, 64, 97, 100, 360, 1024] {
            let (real, imag) = test_signal(n);
            let spectrum = t
                .forward(SignalRepresentation::Complex {
                    real: real.clone(),
                    imag: imag.clone(),
                })
                .unwrap();
            assert_eq!(spectrum.len(), n);

            let back = t
                .inverse(SignalRepresentation::Complex {
                    real: spectrum.real,
                    imag: spectrum.imag,
                })
                .unwrap();
            assert_eq!(back.len(), n);
            for i in 0..n {
                assert!((back.real[i] - real[i]).abs() < 1e-6, "n={n} i={i}");
                assert!((back.imag[i] - imag[i]).abs() < 1e-6, "n={n} i={i}");
            }
        }
    }

    #[test]
    fn forward_uses_native_bin_order() {
        // A single complex exponential at +1 cycle lands in bin 1, at -1 cycle in bin N-1.
        let n = 8;
        let tone = |k: f64| -> SignalRepresentation {
            let (real, imag) = (0..n)
                .map(|i| {
                    let a = 2.0 * std::f64::consts::PI * k * i as f64 / n as f64;
                    (a.cos(), a.sin())
                })
                .unzip();
            SignalRepresentation::Complex { real, imag }
        };
        let mut t = SpectralTransformer::new();

        let pos = t.forward(tone(1.0)).unwrap().power();
        assert!((pos[1] - n as f64).abs() < 1e-9);
        assert!(pos.iter().enumerate().all(|(i, p)| i == 1 || p.abs() < 1e-9));

        let neg = t.forward(tone(-1.0)).unwrap().power();
        assert!((neg[n - 1] - n as f64).abs() < 1e-9);
    }

    #[test]
    fn inverse_of_constant_spectrum_is_impulse() {
        let mut t = SpectralTransformer::new();
        let out = t.inverse(SignalRepresentation::RealOnly(vec![1.0; 5])).unwrap();
        assert!((out.real[0] - 1.0).abs() < 1e-12);
        assert!(out.real[1..].iter().all(|v| v.abs() < 1e-12));
        assert!(out.magnitude().iter().skip(1).all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn lossy_representations_zero_fill() {
        let real = reconstruct(SignalRepresentation::RealOnly(vec![1.0, 2.0])).unwrap();
        assert_eq!(real, vec![Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)]);

        let imag = reconstruct(SignalRepresentation::ImagOnly(vec![3.0])).unwrap();
        assert_eq!(imag, vec![Complex64::new(0.0, 3.0)]);

        let mag = reconstruct(SignalRepresentation::MagnitudeOnly(vec![0.5])).unwrap();
        assert_eq!(mag, vec![Complex64::new(0.5, 0.0)]);
    }

    #[test]
    fn mismatched_complex_parts_are_rejected() {
        let err = reconstruct(SignalRepresentation::Complex {
            real: vec![1.0, 2.0],
            imag: vec![1.0],
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRepresentation { .. }));
    }

    #[test]
    fn empty_input_is_insufficient() {
        let mut t = SpectralTransformer::new();
        let err = t.forward(SignalRepresentation::RealOnly(Vec::new())).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { .. }));
    }
}
