//! One studio run: simulate, optionally filter, interpret, export

use crate::config::StudioConfig;
use anyhow::Context;
use bsp_core::{EcgWaveform, SimulationResult};
use bsp_processing::{
    classify_hr, compute_hr_metrics, educational_disclaimer, summary_text, HrClass, HrMetrics,
    PowerSpectrum,
};
use bsp_simulation::run_simulation;
use serde::Serialize;
use std::fmt;
use std::io;
use tracing::{debug, info};

/// Spectral view of what the bandpass did to the waveform
#[derive(Debug, Clone, Serialize)]
pub struct FilterSummary {
    pub lowcut: f64,
    pub highcut: f64,
    pub order: usize,
    pub raw_dominant_hz: Option<f64>,
    pub filtered_dominant_hz: Option<f64>,
    /// Share of raw power inside the passband
    pub raw_in_band: f64,
    /// Share of filtered power inside the passband
    pub filtered_in_band: f64,
}

/// Human-facing outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct StudioReport {
    pub samples: usize,
    pub duration_s: f64,
    pub fs: u32,
    pub seed: Option<u64>,
    pub metrics: HrMetrics,
    pub classification: HrClass,
    pub description: &'static str,
    pub summary: String,
    pub disclaimer: &'static str,
    pub filter: Option<FilterSummary>,
}

/// Signals and report produced by [`run_studio`]
#[derive(Debug, Clone)]
pub struct StudioRun {
    pub result: SimulationResult,
    pub filtered: Option<EcgWaveform>,
    pub report: StudioReport,
}

pub fn run_studio(config: &StudioConfig) -> anyhow::Result<StudioRun> {
    let sim = &config.simulation;
    let result = run_simulation(sim).context("running simulation")?;
    let fs = sim.fs as f64;
    info!(samples = result.len(), fs = sim.fs, "simulation finished");

    let filtered = config
        .filter
        .apply(result.ecg_raw(), fs)
        .context("applying bandpass filter")?;

    let filter = match &filtered {
        Some(clean) => {
            let highcut = config.filter.effective_highcut();
            let lowcut = config.filter.lowcut;
            let raw_spectrum = PowerSpectrum::compute(result.ecg_raw().as_slice(), fs)?;
            let clean_spectrum = PowerSpectrum::compute(clean.as_slice(), fs)?;
            debug!(lowcut, highcut, "filtered waveform");

            Some(FilterSummary {
                lowcut,
                highcut,
                order: config.filter.order,
                raw_dominant_hz: raw_spectrum.dominant_frequency(),
                filtered_dominant_hz: clean_spectrum.dominant_frequency(),
                raw_in_band: raw_spectrum.band_fraction(lowcut, highcut),
                filtered_in_band: clean_spectrum.band_fraction(lowcut, highcut),
            })
        }
        None => None,
    };

    let metrics = compute_hr_metrics(result.heart_rate()).context("computing heart-rate metrics")?;
    let classification = classify_hr(metrics.mean);

    let report = StudioReport {
        samples: result.len(),
        duration_s: sim.duration_s,
        fs: sim.fs,
        seed: sim.seed,
        metrics,
        classification,
        description: classification.description(),
        summary: summary_text(metrics.mean, classification),
        disclaimer: educational_disclaimer(),
        filter,
    };

    Ok(StudioRun {
        result,
        filtered,
        report,
    })
}

impl StudioRun {
    /// Write `time_s,heart_rate_bpm,ecg_raw[,ecg_filtered]` rows
    pub fn write_csv<W: io::Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header = vec!["time_s", "heart_rate_bpm", "ecg_raw"];
        if self.filtered.is_some() {
            header.push("ecg_filtered");
        }
        csv.write_record(&header)?;

        let time = self.result.time().as_slice();
        let heart_rate = self.result.heart_rate().as_slice();
        let raw = self.result.ecg_raw().as_slice();
        for idx in 0..self.result.len() {
            let mut row = vec![
                time[idx].to_string(),
                heart_rate[idx].to_string(),
                raw[idx].to_string(),
            ];
            if let Some(filtered) = &self.filtered {
                row.push(filtered.as_slice()[idx].to_string());
            }
            csv.write_record(&row)?;
        }

        csv.flush().context("flushing CSV output")?;
        Ok(())
    }
}

impl fmt::Display for StudioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BioSignal Studio - {} samples over {}s at {} Hz", self.samples, self.duration_s, self.fs)?;
        writeln!(f)?;
        writeln!(f, "Mean HR:          {:.0} bpm", self.metrics.mean)?;
        writeln!(f, "Min HR:           {:.0} bpm", self.metrics.min)?;
        writeln!(f, "Max HR:           {:.0} bpm", self.metrics.max)?;
        writeln!(f, "HRV proxy (std):  {:.1} bpm", self.metrics.std)?;
        writeln!(f)?;
        writeln!(f, "Classification: {}", self.classification)?;
        writeln!(f, "{}", self.description)?;
        writeln!(f, "{}", self.summary)?;

        if let Some(filter) = &self.filter {
            writeln!(f)?;
            writeln!(
                f,
                "Bandpass {:.1}-{:.1} Hz (order {}): in-band power {:.1}% -> {:.1}%",
                filter.lowcut,
                filter.highcut,
                filter.order,
                filter.raw_in_band * 100.0,
                filter.filtered_in_band * 100.0
            )?;
            if let (Some(raw), Some(clean)) = (filter.raw_dominant_hz, filter.filtered_dominant_hz) {
                writeln!(f, "Dominant frequency: {:.2} Hz raw, {:.2} Hz filtered", raw, clean)?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.disclaimer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> StudioConfig {
        let mut config = StudioConfig::default();
        config.simulation.duration_s = 5.0;
        config
    }

    #[test]
    fn test_run_with_filter() {
        let run = run_studio(&short_config()).unwrap();

        assert_eq!(run.report.samples, 1500);
        assert_eq!(run.filtered.as_ref().map(|w| w.len()), Some(1500));
        assert_eq!(run.report.classification, HrClass::Normal);

        let filter = run.report.filter.as_ref().unwrap();
        assert!(filter.filtered_in_band > filter.raw_in_band);
    }

    #[test]
    fn test_run_without_filter() {
        let mut config = short_config();
        config.filter.enabled = false;
        let run = run_studio(&config).unwrap();

        assert!(run.filtered.is_none());
        assert!(run.report.filter.is_none());
        assert!(!run.report.to_string().contains("Bandpass"));
    }

    #[test]
    fn test_invalid_simulation_is_reported() {
        let mut config = short_config();
        config.simulation.duration_s = 0.0;
        let err = run_studio(&config).unwrap_err();
        assert!(format!("{:#}", err).contains("duration_s"));
    }

    #[test]
    fn test_csv_export() {
        let run = run_studio(&short_config()).unwrap();
        let mut buffer = Vec::new();
        run.write_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time_s,heart_rate_bpm,ecg_raw,ecg_filtered"));
        assert_eq!(lines.count(), 1500);
        assert!(text.lines().nth(1).unwrap().starts_with("0,70,"));
    }

    #[test]
    fn test_report_text_and_json() {
        let run = run_studio(&short_config()).unwrap();
        let text = run.report.to_string();
        assert!(text.contains("Classification: Normal"));
        assert!(text.contains("not diagnostic"));

        let json = serde_json::to_value(&run.report).unwrap();
        assert_eq!(json["classification"], "Normal");
        assert_eq!(json["samples"], 1500);
    }
}
