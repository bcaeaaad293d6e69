//! Immutable sample series produced by the synthesis pipeline
//!
//! Every stage hands its output to the next one by value. None of these
//! types expose mutable access to their samples; transforming a series
//! always yields a new one.

use crate::error::{BspError, BspResult};
use serde::{Deserialize, Serialize};

/// Shared read-only accessors for the series newtypes
macro_rules! series_accessors {
    ($ty:ident) => {
        impl $ty {
            /// Number of samples
            pub fn len(&self) -> usize {
                self.samples.len()
            }

            /// Check if the series holds no samples
            pub fn is_empty(&self) -> bool {
                self.samples.is_empty()
            }

            /// Borrow the samples
            pub fn as_slice(&self) -> &[f64] {
                &self.samples
            }

            /// Iterate over the samples
            pub fn iter(&self) -> std::slice::Iter<'_, f64> {
                self.samples.iter()
            }

            /// First sample, if any
            pub fn first(&self) -> Option<f64> {
                self.samples.first().copied()
            }

            /// Last sample, if any
            pub fn last(&self) -> Option<f64> {
                self.samples.last().copied()
            }

            /// Consume the series and return the raw samples
            pub fn into_inner(self) -> Vec<f64> {
                self.samples
            }
        }

        impl AsRef<[f64]> for $ty {
            fn as_ref(&self) -> &[f64] {
                &self.samples
            }
        }

        impl<'a> IntoIterator for &'a $ty {
            type Item = &'a f64;
            type IntoIter = std::slice::Iter<'a, f64>;

            fn into_iter(self) -> Self::IntoIter {
                self.samples.iter()
            }
        }
    };
}

/// Uniformly sampled time axis in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct TimeSeries {
    samples: Vec<f64>,
}

impl TimeSeries {
    /// Build a time axis from explicit sample times.
    ///
    /// Samples must be finite and strictly increasing.
    pub fn from_samples(samples: Vec<f64>) -> BspResult<Self> {
        if let Some(idx) = samples.iter().position(|t| !t.is_finite()) {
            return Err(BspError::invalid(
                "time",
                format!("sample {} is not finite", idx),
            ));
        }

        if let Some(idx) = samples.windows(2).position(|w| w[1] <= w[0]) {
            return Err(BspError::invalid(
                "time",
                format!(
                    "samples must be strictly increasing (t[{}]={} >= t[{}]={})",
                    idx,
                    samples[idx],
                    idx + 1,
                    samples[idx + 1]
                ),
            ));
        }

        Ok(TimeSeries { samples })
    }

    /// Mean spacing between consecutive samples.
    ///
    /// `None` when fewer than two samples are present.
    pub fn mean_spacing(&self) -> Option<f64> {
        match (self.samples.first(), self.samples.last()) {
            (Some(&first), Some(&last)) if self.samples.len() >= 2 => {
                // The mean of consecutive differences telescopes to this.
                Some((last - first) / (self.samples.len() - 1) as f64)
            }
            _ => None,
        }
    }

    /// Span covered by the samples (last minus first)
    pub fn span(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(&first), Some(&last)) => last - first,
            _ => 0.0,
        }
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = BspError;

    fn try_from(samples: Vec<f64>) -> BspResult<Self> {
        TimeSeries::from_samples(samples)
    }
}

impl From<TimeSeries> for Vec<f64> {
    fn from(series: TimeSeries) -> Self {
        series.samples
    }
}

/// Heart rate in beats per minute, index-aligned with a [`TimeSeries`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeartRateSeries {
    samples: Vec<f64>,
}

impl HeartRateSeries {
    pub fn new(samples: Vec<f64>) -> Self {
        HeartRateSeries { samples }
    }
}

/// Cumulative cardiac cycle angle in radians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardiacPhase {
    samples: Vec<f64>,
}

impl CardiacPhase {
    pub fn new(samples: Vec<f64>) -> Self {
        CardiacPhase { samples }
    }
}

/// ECG voltage in arbitrary units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EcgWaveform {
    samples: Vec<f64>,
}

impl EcgWaveform {
    pub fn new(samples: Vec<f64>) -> Self {
        EcgWaveform { samples }
    }
}

series_accessors!(TimeSeries);
series_accessors!(HeartRateSeries);
series_accessors!(CardiacPhase);
series_accessors!(EcgWaveform);

/// Output bundle of one simulation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    time: TimeSeries,
    heart_rate: HeartRateSeries,
    ecg_raw: EcgWaveform,
}

impl SimulationResult {
    /// Bundle the three pipeline outputs, checking they are index-aligned
    pub fn new(
        time: TimeSeries,
        heart_rate: HeartRateSeries,
        ecg_raw: EcgWaveform,
    ) -> BspResult<Self> {
        for actual in [heart_rate.len(), ecg_raw.len()] {
            if actual != time.len() {
                return Err(BspError::ShapeMismatch {
                    expected: time.len(),
                    actual,
                });
            }
        }

        Ok(SimulationResult {
            time,
            heart_rate,
            ecg_raw,
        })
    }

    pub fn time(&self) -> &TimeSeries {
        &self.time
    }

    pub fn heart_rate(&self) -> &HeartRateSeries {
        &self.heart_rate
    }

    pub fn ecg_raw(&self) -> &EcgWaveform {
        &self.ecg_raw
    }

    /// Shared sample count of the bundled series
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Split the bundle back into its parts
    pub fn into_parts(self) -> (TimeSeries, HeartRateSeries, EcgWaveform) {
        (self.time, self.heart_rate, self.ecg_raw)
    }
}
