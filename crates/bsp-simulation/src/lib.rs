//! BSP-Simulation: heart-rate and synthetic ECG generation
//!
//! Stylized teaching signals: an exponential heart-rate response to stress
//! and a P-QRS-T waveform driven by the integrated cardiac phase.

pub mod time_base;
pub mod heart_rate;
pub mod beat_template;
pub mod ecg;
pub mod simulation;

pub use time_base::*;
pub use heart_rate::*;
pub use beat_template::*;
pub use ecg::*;
pub use simulation::*;
