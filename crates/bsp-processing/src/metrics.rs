//! Descriptive statistics of a heart-rate trace

use bsp_core::{BspError, BspResult, HeartRateSeries};
use serde::{Deserialize, Serialize};

/// Basic statistics of a heart-rate series (bpm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HrMetrics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation, used as a crude variability proxy
    pub std: f64,
}

impl HrMetrics {
    pub fn calculate(data: &[f64]) -> BspResult<Self> {
        if data.is_empty() {
            return Err(BspError::EmptyInput { what: "heart_rate" });
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>() / n;

        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Ok(Self {
            mean,
            min,
            max,
            std: variance.sqrt(),
        })
    }
}

/// Return basic descriptive statistics for the heart-rate trace
pub fn compute_hr_metrics(heart_rate: &HeartRateSeries) -> BspResult<HrMetrics> {
    HrMetrics::calculate(heart_rate.as_slice())
}
