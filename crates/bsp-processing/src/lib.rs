//! BSP-Processing: post-hoc analysis of simulated signals
//!
//! Zero-phase bandpass filtering, power spectra, heart-rate metrics and the
//! teaching-oriented classification built on top of them.

pub mod filters;
pub mod spectrum;
pub mod metrics;
pub mod interpretation;
pub mod config;

pub use filters::{ButterworthBandpass, apply_bandpass_filter};
pub use spectrum::PowerSpectrum;
pub use metrics::{HrMetrics, compute_hr_metrics};
pub use interpretation::{
    HrClass, classify_hr, summary_text, educational_disclaimer
};
pub use config::FilterConfig;
