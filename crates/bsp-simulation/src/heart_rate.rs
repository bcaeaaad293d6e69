//! Exponential heart-rate response to a stress step

use bsp_core::{HeartRateSeries, TimeSeries};
use serde::{Deserialize, Serialize};

/// Default smoothing time constant of the response (s)
pub const DEFAULT_TAU: f64 = 4.0;
/// Smallest time constant the model accepts; shorter values are raised to it
pub const MIN_TAU: f64 = 0.5;

/// First-order rise from the resting rate toward a stress-dependent target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateResponse {
    /// Resting heart rate (bpm)
    pub hr_rest: f64,
    /// Heart rate reached at 100 % stress (bpm)
    pub hr_peak: f64,
    /// Stress / exercise level in percent, clamped to 0..=100
    pub stress_level: f64,
    /// Smoothing time constant (s)
    pub tau: f64,
}

impl HeartRateResponse {
    pub fn new(hr_rest: f64, hr_peak: f64, stress_level: f64) -> Self {
        Self {
            hr_rest,
            hr_peak,
            stress_level,
            tau: DEFAULT_TAU,
        }
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Peak rate after the permissive clamp: never below the resting rate
    pub fn effective_peak(&self) -> f64 {
        self.hr_peak.max(self.hr_rest)
    }

    /// Time constant after flooring at [`MIN_TAU`]
    pub fn effective_tau(&self) -> f64 {
        self.tau.max(MIN_TAU)
    }

    /// Total rise from rest to target (bpm)
    fn rise(&self) -> f64 {
        let stress_frac = (self.stress_level / 100.0).clamp(0.0, 1.0);
        (self.effective_peak() - self.hr_rest) * stress_frac
    }

    /// Asymptotic heart rate for the configured stress level
    pub fn target(&self) -> f64 {
        self.hr_rest + self.rise()
    }

    /// Heart rate at time `t` seconds after the stress step.
    ///
    /// Equivalent to `target - (target - hr_rest) * exp(-t / tau)`, written so
    /// that `rate_at(0.0) == hr_rest` and `rate_at(t) <= target` hold exactly.
    pub fn rate_at(&self, t: f64) -> f64 {
        let settled = 1.0 - (-t / self.effective_tau()).exp();
        self.hr_rest + self.rise() * settled
    }

    /// Evaluate the response along a whole time axis
    pub fn trajectory(&self, time: &TimeSeries) -> HeartRateSeries {
        HeartRateSeries::new(time.iter().map(|&t| self.rate_at(t)).collect())
    }
}

/// Generate a smooth heart-rate trajectory using a simple exponential
pub fn simulate_heart_rate(
    time: &TimeSeries,
    hr_rest: f64,
    hr_peak: f64,
    stress_level: f64,
    tau: f64,
) -> HeartRateSeries {
    HeartRateResponse::new(hr_rest, hr_peak, stress_level)
        .with_tau(tau)
        .trajectory(time)
}
