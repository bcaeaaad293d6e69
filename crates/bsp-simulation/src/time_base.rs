//! Uniform time axis generation

use bsp_core::{BspError, BspResult, TimeSeries};

/// Sampling rate used when the caller does not pick one (Hz)
pub const DEFAULT_SAMPLING_RATE: u32 = 300;

/// Create an evenly spaced time axis over `[0, duration_s)`.
///
/// Produces `floor(duration_s * fs)` samples spaced by `duration_s / N`;
/// the right endpoint is excluded.
pub fn create_time_base(duration_s: f64, fs: u32) -> BspResult<TimeSeries> {
    if !duration_s.is_finite() || duration_s <= 0.0 {
        return Err(BspError::invalid(
            "duration_s",
            format!("must be positive, got {}", duration_s),
        ));
    }
    if fs == 0 {
        return Err(BspError::invalid("fs", "sampling rate must be positive"));
    }

    let n_samples = (duration_s * fs as f64).floor() as usize;
    if n_samples == 0 {
        return Err(BspError::invalid(
            "duration_s",
            format!("{}s is shorter than one sample period at {}Hz", duration_s, fs),
        ));
    }

    let step = duration_s / n_samples as f64;
    let samples = (0..n_samples).map(|i| i as f64 * step).collect();

    TimeSeries::from_samples(samples)
}
