//! End-to-end simulation: time base, heart-rate response, raw ECG

use crate::ecg::{generate_ecg_signal, EcgConfig, NoiseSource};
use crate::heart_rate::HeartRateResponse;
use crate::time_base::{create_time_base, DEFAULT_SAMPLING_RATE};
use bsp_core::{BspResult, SimulationResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of one simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total simulated time (s)
    pub duration_s: f64,
    /// Sampling rate (Hz)
    pub fs: u32,
    /// Resting heart rate (bpm)
    pub hr_rest: f64,
    /// Peak / exercise heart rate (bpm)
    pub hr_peak: f64,
    /// Stress / exercise level (%)
    pub stress_level: f64,
    /// White-noise standard deviation (a.u.)
    pub noise_level: f64,
    /// Baseline wander amplitude (a.u.)
    pub baseline_wander: f64,
    /// Noise seed; `None` draws from OS entropy and is written as `seed = false`
    #[serde(with = "seed_setting")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_s: 12.0,
            fs: DEFAULT_SAMPLING_RATE,
            hr_rest: 70.0,
            hr_peak: 130.0,
            stress_level: 40.0,
            noise_level: 0.15,
            baseline_wander: 0.2,
            seed: Some(42),
        }
    }
}

impl SimulationConfig {
    pub fn heart_rate_response(&self) -> HeartRateResponse {
        HeartRateResponse::new(self.hr_rest, self.hr_peak, self.stress_level)
    }

    pub fn ecg_config(&self) -> EcgConfig {
        EcgConfig {
            noise_level: self.noise_level,
            baseline_wander: self.baseline_wander,
        }
    }
}

/// `seed` on disk: an integer, or `false` (also `null`) for an unseeded run.
/// An absent key keeps the default seed.
mod seed_setting {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedRepr {
        Fixed(u64),
        Flag(bool),
        Unset,
    }

    pub fn serialize<S: Serializer>(seed: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match seed {
            Some(value) => serializer.serialize_u64(*value),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match SeedRepr::deserialize(deserializer)? {
            SeedRepr::Fixed(value) => Ok(Some(value)),
            SeedRepr::Flag(false) | SeedRepr::Unset => Ok(None),
            SeedRepr::Flag(true) => Err(D::Error::custom(
                "seed must be an integer, or false for an unseeded run",
            )),
        }
    }
}

/// Run the full synthesis pipeline and return time, heart-rate and raw ECG
pub fn run_simulation(config: &SimulationConfig) -> BspResult<SimulationResult> {
    let time = create_time_base(config.duration_s, config.fs)?;
    let response = config.heart_rate_response();
    let heart_rate = response.trajectory(&time);

    debug!(
        samples = time.len(),
        target_bpm = response.target(),
        "heart-rate trajectory ready"
    );

    let mut noise = NoiseSource::from_seed(config.seed);
    let ecg_raw = generate_ecg_signal(&time, &heart_rate, &config.ecg_config(), &mut noise)?;

    SimulationResult::new(time, heart_rate, ecg_raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat_template::heartbeat_template;
    use crate::ecg::cardiac_phase;
    use bsp_core::BspError;

    fn teaching_scenario() -> SimulationConfig {
        SimulationConfig {
            duration_s: 10.0,
            fs: 300,
            hr_rest: 70.0,
            hr_peak: 130.0,
            stress_level: 40.0,
            noise_level: 0.0,
            baseline_wander: 0.0,
            seed: Some(1),
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let result = run_simulation(&teaching_scenario()).unwrap();

        assert_eq!(result.len(), 3000);
        assert_eq!(result.time().first(), Some(0.0));
        assert!(result.time().last().unwrap() < 10.0);

        let hr = result.heart_rate();
        assert_eq!(hr.first(), Some(70.0));
        let t_last = result.time().last().unwrap();
        let expected_last = 70.0 + (130.0 - 70.0) * 0.4 * (1.0 - (-t_last / 4.0).exp());
        assert!((hr.last().unwrap() - expected_last).abs() < 0.1);
        assert!(hr.last().unwrap() < 94.0);

        let phase = cardiac_phase(result.time(), hr).unwrap();
        assert_eq!(result.ecg_raw().len(), 3000);
        for (value, &p) in result.ecg_raw().iter().zip(phase.iter()) {
            assert_eq!(*value, heartbeat_template(p));
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = SimulationConfig::default();
        let a = run_simulation(&config).unwrap();
        let b = run_simulation(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3600);
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let config = SimulationConfig {
            duration_s: 0.0,
            ..teaching_scenario()
        };
        assert!(matches!(
            run_simulation(&config),
            Err(BspError::InvalidParameter { name: "duration_s", .. })
        ));
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"duration_s": 5.0, "seed": null}"#).unwrap();
        assert_eq!(config.duration_s, 5.0);
        assert_eq!(config.fs, 300);
        assert_eq!(config.seed, None);
        assert_eq!(config.hr_peak, 130.0);
    }

    #[test]
    fn test_unseeded_config_survives_serialization() {
        let config = SimulationConfig {
            seed: None,
            ..SimulationConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["seed"], false);

        let back: SimulationConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back.seed, None);

        let seeded: SimulationConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(seeded.seed, Some(7));
        let missing: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.seed, Some(42));
        assert!(serde_json::from_str::<SimulationConfig>(r#"{"seed": true}"#).is_err());
    }
}
