//! Power spectrum helpers for inspecting raw and filtered waveforms

use bsp_core::{BspError, BspResult};
use rustfft::{FftPlanner, num_complex::Complex};
use serde::{Deserialize, Serialize};

/// One-sided, unnormalised periodogram of a real signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    /// Frequency spacing between bins (Hz)
    pub resolution: f64,
    /// Power per bin, from DC up to Nyquist
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    /// Compute the spectrum of `samples` taken at `sampling_rate` Hz.
    ///
    /// The signal is zero-padded to the next power of two.
    pub fn compute(samples: &[f64], sampling_rate: f64) -> BspResult<Self> {
        if samples.is_empty() {
            return Err(BspError::EmptyInput { what: "samples" });
        }
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(BspError::invalid(
                "fs",
                format!("sampling rate must be positive, got {}", sampling_rate),
            ));
        }

        let fft_size = samples.len().next_power_of_two();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_size);

        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(fft_size, Complex::new(0.0, 0.0));
        fft.process(&mut buffer);

        let scale = 1.0 / samples.len() as f64;
        let power = buffer[..=fft_size / 2]
            .iter()
            .map(|c| c.norm_sqr() * scale)
            .collect();

        Ok(PowerSpectrum {
            resolution: sampling_rate / fft_size as f64,
            power,
        })
    }

    /// Centre frequency of bin `idx` (Hz)
    pub fn frequency(&self, idx: usize) -> f64 {
        idx as f64 * self.resolution
    }

    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }

    /// Summed power of the bins whose frequency lies in `[low, high]`
    pub fn band_power(&self, low: f64, high: f64) -> f64 {
        self.power
            .iter()
            .enumerate()
            .filter(|(idx, _)| {
                let freq = self.frequency(*idx);
                freq >= low && freq <= high
            })
            .map(|(_, p)| p)
            .sum()
    }

    /// Fraction of the total power inside `[low, high]`, 0 for a silent signal
    pub fn band_fraction(&self, low: f64, high: f64) -> f64 {
        let total = self.total_power();
        if total > 0.0 {
            self.band_power(low, high) / total
        } else {
            0.0
        }
    }

    /// Frequency of the strongest non-DC bin
    pub fn dominant_frequency(&self) -> Option<f64> {
        self.power
            .iter()
            .enumerate()
            .skip(1)
            .fold(None, |best: Option<(usize, f64)>, (idx, &p)| match best {
                Some((_, best_power)) if best_power >= p => best,
                _ => Some((idx, p)),
            })
            .map(|(idx, _)| self.frequency(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, fs: f64, samples: usize) -> Vec<f64> {
        (0..samples)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_dominant_frequency_of_tone() {
        let spectrum = PowerSpectrum::compute(&tone(12.0, 300.0, 3000), 300.0).unwrap();
        assert_eq!(spectrum.power.len(), 4096 / 2 + 1);

        let peak = spectrum.dominant_frequency().unwrap();
        assert!((peak - 12.0).abs() <= spectrum.resolution);
    }

    #[test]
    fn test_band_power_concentrates_around_tone() {
        let data: Vec<f64> = tone(10.0, 256.0, 256)
            .iter()
            .zip(tone(50.0, 256.0, 256))
            .map(|(a, b)| a + 0.5 * b)
            .collect();
        let spectrum = PowerSpectrum::compute(&data, 256.0).unwrap();

        assert!(spectrum.total_power() > 0.0);
        let low_band = spectrum.band_power(5.0, 15.0);
        let high_band = spectrum.band_power(45.0, 55.0);
        assert!(low_band > high_band);
        assert!(spectrum.band_fraction(0.0, 128.0) > 0.999);
    }

    #[test]
    fn test_silent_signal() {
        let spectrum = PowerSpectrum::compute(&[0.0; 64], 100.0).unwrap();
        assert_eq!(spectrum.band_fraction(0.0, 50.0), 0.0);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            PowerSpectrum::compute(&[], 300.0).unwrap_err(),
            BspError::EmptyInput { what: "samples" }
        );
        assert!(matches!(
            PowerSpectrum::compute(&[1.0, 2.0], 0.0),
            Err(BspError::InvalidParameter { name: "fs", .. })
        ));
    }
}
