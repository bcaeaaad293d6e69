//! Zero-phase Butterworth bandpass filtering
//!
//! The filter is designed from the analog Butterworth prototype: its poles are
//! moved to the requested band with the lowpass-to-bandpass transform and then
//! mapped to the z-plane with the bilinear transform (cutoffs pre-warped, so
//! the -3 dB points land exactly on `lowcut` and `highcut`). The result is kept
//! as a cascade of biquad sections for numerical stability and applied
//! forward and backward so the output has no net phase shift.

use bsp_core::{BspError, BspResult, EcgWaveform};
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

/// Sampling rate of the normalised design domain; cutoffs are expressed as a
/// fraction of Nyquist, so the bilinear transform runs at `fs = 2`.
const DESIGN_FS: f64 = 2.0;

/// Highest prototype order accepted by [`ButterworthBandpass::design`]
pub const MAX_ORDER: usize = 16;

/// Single biquad section (2nd order), `a0` normalised to 1
#[derive(Debug, Clone, Copy, PartialEq)]
struct BiquadSection {
    // y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    b0: f64, b1: f64, b2: f64,
    a1: f64, a2: f64,
}

impl BiquadSection {
    /// Bandpass section with one zero at z = 1 and one at z = -1
    fn with_poles(gain: f64, p1: Complex64, p2: Complex64) -> Self {
        Self {
            b0: gain,
            b1: 0.0,
            b2: -gain,
            a1: -(p1 + p2).re,
            a2: (p1 * p2).re,
        }
    }

    /// Transposed direct form II step
    fn process_sample(&self, input: f64, state: &mut [f64; 2]) -> f64 {
        let output = self.b0 * input + state[0];
        state[0] = self.b1 * input - self.a1 * output + state[1];
        state[1] = self.b2 * input - self.a2 * output;
        output
    }

    /// State reached after an infinitely long unit step
    fn step_state(&self) -> [f64; 2] {
        let u0 = self.b1 - self.a1 * self.b0;
        let u1 = self.b2 - self.a2 * self.b0;
        let det = 1.0 + self.a1 + self.a2;
        [(u0 + u1) / det, ((1.0 + self.a1) * u1 - self.a2 * u0) / det]
    }

    fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Complex response at `z = e^{jω}`
    fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        (self.b0 + z1 * self.b1 + z2 * self.b2) / (1.0 + z1 * self.a1 + z2 * self.a2)
    }
}

/// Digital Butterworth bandpass realised as a biquad cascade
#[derive(Debug, Clone, PartialEq)]
pub struct ButterworthBandpass {
    biquads: Vec<BiquadSection>,
    sampling_rate: f64,
    lowcut: f64,
    highcut: f64,
    order: usize,
}

impl ButterworthBandpass {
    /// Design a bandpass of the given prototype order.
    ///
    /// The cascade has `order` sections, i.e. `2 * order` poles, matching the
    /// usual convention for bandpass Butterworth designs.
    pub fn design(sampling_rate: f64, lowcut: f64, highcut: f64, order: usize) -> BspResult<Self> {
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(BspError::invalid(
                "fs",
                format!("sampling rate must be positive, got {}", sampling_rate),
            ));
        }
        if !lowcut.is_finite() || lowcut <= 0.0 {
            return Err(BspError::invalid(
                "lowcut",
                format!("cutoff frequencies must be positive, got {}", lowcut),
            ));
        }
        if !highcut.is_finite() || highcut <= 0.0 {
            return Err(BspError::invalid(
                "highcut",
                format!("cutoff frequencies must be positive, got {}", highcut),
            ));
        }
        if highcut <= lowcut {
            return Err(BspError::invalid(
                "highcut",
                format!("must be greater than lowcut ({} <= {})", highcut, lowcut),
            ));
        }
        let nyquist = 0.5 * sampling_rate;
        if highcut >= nyquist {
            return Err(BspError::invalid(
                "highcut",
                format!("must be below the Nyquist frequency ({} >= {})", highcut, nyquist),
            ));
        }
        if order == 0 || order > MAX_ORDER {
            return Err(BspError::invalid(
                "order",
                format!("filter order must be between 1 and {}, got {}", MAX_ORDER, order),
            ));
        }

        let biquads = design_sections(lowcut / nyquist, highcut / nyquist, order);

        debug!(
            fs = sampling_rate,
            lowcut,
            highcut,
            order,
            sections = biquads.len(),
            "designed Butterworth bandpass"
        );

        Ok(ButterworthBandpass {
            biquads,
            sampling_rate,
            lowcut,
            highcut,
            order,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    /// Passband edges `(lowcut, highcut)` in Hz
    pub fn band(&self) -> (f64, f64) {
        (self.lowcut, self.highcut)
    }

    /// Magnitude response of a single pass at `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / self.sampling_rate;
        self.biquads
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, biquad| acc * biquad.response(omega))
            .norm()
    }

    /// Samples of odd-reflection padding added at each end before filtering
    pub fn padding_len(&self) -> usize {
        3 * (2 * self.biquads.len() + 1)
    }

    /// Filter once, front to back, starting from the steady state of `x[0]`
    pub fn filter_forward(&self, input: &[f64]) -> Vec<f64> {
        let initial = match input.first() {
            Some(&x0) => x0,
            None => return Vec::new(),
        };

        let mut states: Vec<[f64; 2]> = self
            .cascade_step_states()
            .into_iter()
            .map(|[s0, s1]| [s0 * initial, s1 * initial])
            .collect();

        input
            .iter()
            .map(|&sample| {
                self.biquads
                    .iter()
                    .zip(states.iter_mut())
                    .fold(sample, |value, (biquad, state)| biquad.process_sample(value, state))
            })
            .collect()
    }

    /// Forward-backward filtering with odd-reflection padding.
    ///
    /// The output has the same length as the input and zero phase distortion.
    pub fn filtfilt(&self, input: &[f64]) -> BspResult<Vec<f64>> {
        if input.is_empty() {
            return Err(BspError::EmptyInput { what: "waveform" });
        }

        let pad = self.padding_len().min(input.len() - 1);
        let extended = odd_extension(input, pad);

        let mut forward = self.filter_forward(&extended);
        forward.reverse();
        let mut backward = self.filter_forward(&forward);
        backward.reverse();

        Ok(backward[pad..pad + input.len()].to_vec())
    }

    /// Initial states of every section for a unit step through the cascade
    fn cascade_step_states(&self) -> Vec<[f64; 2]> {
        let mut scale = 1.0;
        self.biquads
            .iter()
            .map(|biquad| {
                let [s0, s1] = biquad.step_state();
                let state = [s0 * scale, s1 * scale];
                scale *= biquad.dc_gain();
                state
            })
            .collect()
    }
}

/// Butterworth bandpass sections for cutoffs normalised to Nyquist (0 < low < high < 1)
fn design_sections(low: f64, high: f64, order: usize) -> Vec<BiquadSection> {
    // Pre-warp both edges into the analog domain of the bilinear transform.
    let warp = |wn: f64| 2.0 * DESIGN_FS * (PI * wn / DESIGN_FS).tan();
    let (warped_low, warped_high) = (warp(low), warp(high));
    let bandwidth = warped_high - warped_low;
    let center_sq = warped_low * warped_high;

    let bilinear = |s: Complex64| (2.0 * DESIGN_FS + s) / (2.0 * DESIGN_FS - s);
    // Bandpass poles of one lowpass prototype pole: roots of s^2 - p*bw*s + w0^2.
    let split = |p: Complex64| {
        let shifted = p * (bandwidth / 2.0);
        let disc = (shifted * shifted - center_sq).sqrt();
        (shifted + disc, shifted - disc)
    };

    let mut analog_poles = Vec::with_capacity(2 * order);
    let mut poles = Vec::with_capacity(order);

    for k in 0..order {
        let twice_k = 2 * k + 1;
        if twice_k > order {
            // Lower half-plane poles are covered by their conjugates.
            continue;
        }
        if twice_k == order {
            let (q1, q2) = split(Complex64::new(-1.0, 0.0));
            analog_poles.extend([q1, q2]);
            poles.push((bilinear(q1), bilinear(q2)));
        } else {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let (q1, q2) = split(Complex64::from_polar(1.0, theta));
            analog_poles.extend([q1, q1.conj(), q2, q2.conj()]);
            let (z1, z2) = (bilinear(q1), bilinear(q2));
            poles.push((z1, z1.conj()));
            poles.push((z2, z2.conj()));
        }
    }

    // Analog gain bw^N with N zeros at the origin, carried through the
    // bilinear transform: k * prod(2fs - zeros) / prod(2fs - poles).
    let two_fs = 2.0 * DESIGN_FS;
    let numerator = (bandwidth * two_fs).powi(order as i32);
    let denominator = analog_poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &q| acc * (two_fs - q));
    let gain = (Complex64::new(numerator, 0.0) / denominator).re;

    poles
        .into_iter()
        .enumerate()
        .map(|(idx, (p1, p2))| {
            let section_gain = if idx == 0 { gain } else { 1.0 };
            BiquadSection::with_poles(section_gain, p1, p2)
        })
        .collect()
}

/// Extend a signal by `pad` samples at each end with its odd reflection
fn odd_extension(input: &[f64], pad: usize) -> Vec<f64> {
    let last = input.len() - 1;
    let (first_value, last_value) = (input[0], input[last]);

    let mut extended = Vec::with_capacity(input.len() + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first_value - input[i]));
    extended.extend_from_slice(input);
    extended.extend((1..=pad).map(|i| 2.0 * last_value - input[last - i]));
    extended
}

/// Apply a zero-phase Butterworth bandpass to an ECG waveform
pub fn apply_bandpass_filter(
    waveform: &EcgWaveform,
    fs: f64,
    lowcut: f64,
    highcut: f64,
    order: usize,
) -> BspResult<EcgWaveform> {
    let filter = ButterworthBandpass::design(fs, lowcut, highcut, order)?;
    filter.filtfilt(waveform.as_slice()).map(EcgWaveform::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 300.0;

    fn tone(freq: f64, samples: usize) -> Vec<f64> {
        (0..samples)
            .map(|i| (2.0 * PI * freq * i as f64 / FS).cos())
            .collect()
    }

    fn rms(data: &[f64]) -> f64 {
        (data.iter().map(|x| x * x).sum::<f64>() / data.len() as f64).sqrt()
    }

    fn argmax(data: &[f64]) -> usize {
        data.iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    #[test]
    fn test_cutoffs_are_half_power_points() {
        for order in [1, 2, 3, 4, 6] {
            let filter = ButterworthBandpass::design(FS, 0.8, 30.0, order).unwrap();
            assert_eq!(filter.biquads.len(), order);

            let half_power = std::f64::consts::FRAC_1_SQRT_2;
            assert!((filter.magnitude_at(0.8) - half_power).abs() < 1e-6, "order {}", order);
            assert!((filter.magnitude_at(30.0) - half_power).abs() < 1e-6, "order {}", order);
            assert!((filter.magnitude_at(5.0) - 1.0).abs() < 1e-3, "order {}", order);
        }
    }

    #[test]
    fn test_invalid_cutoffs() {
        for (low, high) in [(0.0, 30.0), (0.8, 0.0), (-1.0, 30.0), (5.0, 3.0), (5.0, 5.0)] {
            let err = ButterworthBandpass::design(FS, low, high, 4).unwrap_err();
            assert!(matches!(err, BspError::InvalidParameter { .. }), "{} {}", low, high);
        }
        assert!(matches!(
            ButterworthBandpass::design(FS, 0.8, 150.0, 4),
            Err(BspError::InvalidParameter { name: "highcut", .. })
        ));
        assert!(matches!(
            ButterworthBandpass::design(FS, 0.8, 30.0, 0),
            Err(BspError::InvalidParameter { name: "order", .. })
        ));
        assert!(matches!(
            ButterworthBandpass::design(0.0, 0.8, 30.0, 4),
            Err(BspError::InvalidParameter { name: "fs", .. })
        ));
    }

    #[test]
    fn test_order_upper_bound() {
        assert!(ButterworthBandpass::design(FS, 0.8, 30.0, MAX_ORDER).is_ok());
        for order in [MAX_ORDER + 1, usize::MAX] {
            assert!(matches!(
                ButterworthBandpass::design(FS, 0.8, 30.0, order),
                Err(BspError::InvalidParameter { name: "order", .. })
            ));
        }
    }

    #[test]
    fn test_reversed_band_reports_highcut() {
        let waveform = EcgWaveform::new(tone(5.0, 600));
        let err = apply_bandpass_filter(&waveform, FS, 5.0, 3.0, 4).unwrap_err();
        assert!(matches!(err, BspError::InvalidParameter { name: "highcut", .. }));
    }

    #[test]
    fn test_output_length_matches_input() {
        for order in [2, 4, 6] {
            let filter = ButterworthBandpass::design(FS, 0.8, 30.0, order).unwrap();
            for len in [1, 2, 5, 40, 3000] {
                let output = filter.filtfilt(&tone(5.0, len)).unwrap();
                assert_eq!(output.len(), len);
                assert!(output.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn test_empty_waveform() {
        let filter = ButterworthBandpass::design(FS, 0.8, 30.0, 4).unwrap();
        assert_eq!(
            filter.filtfilt(&[]).unwrap_err(),
            BspError::EmptyInput { what: "waveform" }
        );
    }

    #[test]
    fn test_zero_phase_keeps_peaks_in_place() {
        let filter = ButterworthBandpass::design(FS, 0.8, 30.0, 4).unwrap();

        for freq in [5.0, 15.0] {
            let input = tone(freq, 3000);
            let output = filter.filtfilt(&input).unwrap();

            // Look at one period centred on the peak at sample 1260.
            let period = (FS / freq) as usize;
            let window = 1260 - period / 2..1260 + period / 2;
            assert_eq!(argmax(&input[window.clone()]), period / 2);
            assert_eq!(argmax(&output[window]), period / 2, "{} Hz", freq);
        }
    }

    #[test]
    fn test_single_pass_lags() {
        let filter = ButterworthBandpass::design(FS, 0.8, 30.0, 4).unwrap();
        let output = filter.filter_forward(&tone(15.0, 3000));

        // Away from the band centre a causal pass shifts the peak.
        assert_ne!(argmax(&output[1250..1270]), 10);
    }

    #[test]
    fn test_passband_and_stopbands() {
        let filter = ButterworthBandpass::design(FS, 0.8, 30.0, 4).unwrap();
        let middle = 600..2400;

        let pass = filter.filtfilt(&tone(5.0, 3000)).unwrap();
        let reference = tone(5.0, 3000);
        assert!((rms(&pass[middle.clone()]) / rms(&reference[middle.clone()]) - 1.0).abs() < 0.01);

        let drift = filter.filtfilt(&tone(0.2, 3000)).unwrap();
        assert!(rms(&drift[middle.clone()]) < 0.1 * rms(&tone(0.2, 3000)[middle.clone()]));

        let hum = filter.filtfilt(&tone(60.0, 3000)).unwrap();
        assert!(rms(&hum[middle.clone()]) < 0.1 * rms(&tone(60.0, 3000)[middle]));
    }

    #[test]
    fn test_constant_signal_is_removed() {
        let filter = ButterworthBandpass::design(FS, 0.8, 30.0, 2).unwrap();
        let output = filter.filtfilt(&vec![3.0; 1500]).unwrap();
        assert!(output.iter().all(|v| v.abs() < 1e-6));
    }
}
