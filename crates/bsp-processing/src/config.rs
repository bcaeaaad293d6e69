//! Configuration for the optional denoising stage

use crate::filters::ButterworthBandpass;
use bsp_core::{BspResult, EcgWaveform};
use serde::{Deserialize, Serialize};

/// Smallest passband width enforced by [`FilterConfig::effective_highcut`] (Hz)
pub const MIN_PASSBAND_HZ: f64 = 1.0;

/// Bandpass settings chosen by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Whether filtering is requested at all
    pub enabled: bool,
    /// Low cutoff (Hz), removes baseline drift
    pub lowcut: f64,
    /// High cutoff (Hz), removes high-frequency noise
    pub highcut: f64,
    /// Prototype order; 2, 4 or 6 are typical
    pub order: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lowcut: 0.8,
            highcut: 30.0,
            order: 4,
        }
    }
}

impl FilterConfig {
    /// Create bandpass filter configuration
    pub fn bandpass(lowcut: f64, highcut: f64, order: usize) -> Self {
        Self {
            enabled: true,
            lowcut,
            highcut,
            order,
        }
    }

    /// High cutoff widened so the passband spans at least [`MIN_PASSBAND_HZ`]
    pub fn effective_highcut(&self) -> f64 {
        self.highcut.max(self.lowcut + MIN_PASSBAND_HZ)
    }

    /// Design the filter for a given sampling rate
    pub fn design(&self, sampling_rate: f64) -> BspResult<ButterworthBandpass> {
        ButterworthBandpass::design(sampling_rate, self.lowcut, self.effective_highcut(), self.order)
    }

    /// Filter `waveform` when enabled, `None` otherwise
    pub fn apply(&self, waveform: &EcgWaveform, sampling_rate: f64) -> BspResult<Option<EcgWaveform>> {
        if !self.enabled {
            return Ok(None);
        }
        let filter = self.design(sampling_rate)?;
        filter.filtfilt(waveform.as_slice()).map(|samples| Some(EcgWaveform::new(samples)))
    }
}
