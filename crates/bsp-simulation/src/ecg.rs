//! Synthetic ECG waveform generation
//!
//! The heart-rate curve is integrated into a cardiac phase, the beat template
//! is evaluated along that phase, and slow baseline wander plus white
//! Gaussian noise are added on top.

use crate::beat_template::template_series;
use bsp_core::{BspError, BspResult, CardiacPhase, EcgWaveform, HeartRateSeries, TimeSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

/// Frequency of the sinusoidal baseline drift (Hz)
pub const BASELINE_WANDER_FREQ: f64 = 0.2;

/// Random source for measurement noise.
///
/// Owned by a single generation call; two sources built from the same seed
/// yield bit-identical sequences.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: StdRng,
    seed: Option<u64>,
}

impl NoiseSource {
    /// Deterministic source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Source seeded from operating-system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Seeded when a seed is given, entropy-backed otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Seed this source was built from, if deterministic
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Draw one sample from N(0, 1)
    pub fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// Artifact amplitudes applied on top of the beat template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcgConfig {
    /// Standard deviation of the additive white noise (a.u.)
    pub noise_level: f64,
    /// Amplitude of the 0.2 Hz baseline drift (a.u.)
    pub baseline_wander: f64,
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            noise_level: 0.05,
            baseline_wander: 0.1,
        }
    }
}

impl EcgConfig {
    pub fn validate(&self) -> BspResult<()> {
        for (name, value) in [
            ("noise_level", self.noise_level),
            ("baseline_wander", self.baseline_wander),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BspError::invalid(
                    name,
                    format!("must be a non-negative amplitude, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// Check that a time axis and heart-rate curve can be combined sample by sample.
///
/// Returns the mean sample spacing.
fn aligned_spacing(time: &TimeSeries, heart_rate: &HeartRateSeries) -> BspResult<f64> {
    if heart_rate.len() != time.len() {
        return Err(BspError::ShapeMismatch {
            expected: time.len(),
            actual: heart_rate.len(),
        });
    }
    if time.is_empty() {
        return Err(BspError::EmptyInput { what: "time" });
    }

    time.mean_spacing().ok_or_else(|| {
        BspError::invalid("time", "at least two samples are needed to derive the spacing")
    })
}

/// Integrate heart rate into cumulative cardiac phase (left Riemann sum).
///
/// `phase[0]` already includes the first increment, `2π * hr[0] / 60 * dt`.
pub fn cardiac_phase(time: &TimeSeries, heart_rate: &HeartRateSeries) -> BspResult<CardiacPhase> {
    let dt = aligned_spacing(time, heart_rate)?;

    let mut accumulated = 0.0;
    let phase = heart_rate
        .iter()
        .map(|&hr| {
            let freq = hr / 60.0;
            accumulated += 2.0 * PI * freq * dt;
            accumulated
        })
        .collect();

    Ok(CardiacPhase::new(phase))
}

/// Create a synthetic ECG-like waveform aligned with the heart rate
pub fn generate_ecg_signal(
    time: &TimeSeries,
    heart_rate: &HeartRateSeries,
    config: &EcgConfig,
    noise: &mut NoiseSource,
) -> BspResult<EcgWaveform> {
    config.validate()?;
    let phase = cardiac_phase(time, heart_rate)?;
    let template = template_series(&phase);

    debug!(
        samples = time.len(),
        noise_level = config.noise_level,
        baseline_wander = config.baseline_wander,
        seed = ?noise.seed(),
        "synthesizing ECG waveform"
    );

    let ecg = template
        .iter()
        .zip(time.iter())
        .map(|(&beat, &t)| {
            let baseline = config.baseline_wander * (2.0 * PI * BASELINE_WANDER_FREQ * t).sin();
            // Always draw, so the realization depends only on seed and length.
            let white = config.noise_level * noise.standard_normal();
            beat + baseline + white
        })
        .collect();

    Ok(EcgWaveform::new(ecg))
}
