//! BioSignal Studio - simulate exercise heart rate and ECG, filter, interpret

mod config;
mod report;

use anyhow::Context;
use clap::Parser;
use config::StudioConfig;
use report::run_studio;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Educational heart-rate and ECG simulation driver")]
struct Args {
    /// Load simulation and filter settings from TOML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulation length (s)
    #[arg(long)]
    duration: Option<f64>,
    /// Sampling rate (Hz)
    #[arg(long)]
    fs: Option<u32>,
    /// Resting heart rate (bpm)
    #[arg(long)]
    rest: Option<f64>,
    /// Peak heart rate (bpm)
    #[arg(long)]
    peak: Option<f64>,
    /// Stress level, 0-100 %
    #[arg(long)]
    stress: Option<f64>,
    /// Noise standard deviation (mV)
    #[arg(long)]
    noise: Option<f64>,
    /// Baseline wander amplitude (mV)
    #[arg(long)]
    wander: Option<f64>,
    /// Seed for repeatable noise
    #[arg(long, conflicts_with = "unseeded")]
    seed: Option<u64>,
    /// Draw noise from OS entropy instead of a seed
    #[arg(long, default_value_t = false)]
    unseeded: bool,
    /// Skip the bandpass stage
    #[arg(long, default_value_t = false)]
    no_filter: bool,
    #[arg(long)]
    lowcut: Option<f64>,
    #[arg(long)]
    highcut: Option<f64>,
    #[arg(long)]
    order: Option<usize>,
    /// Write time, heart rate and ECG samples to CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Print the resolved configuration as TOML and exit
    #[arg(long, default_value_t = false)]
    dump_config: bool,
}

impl Args {
    /// Command-line values take precedence over the file
    fn apply_overrides(&self, config: &mut StudioConfig) {
        let sim = &mut config.simulation;
        if let Some(duration) = self.duration {
            sim.duration_s = duration;
        }
        if let Some(fs) = self.fs {
            sim.fs = fs;
        }
        if let Some(rest) = self.rest {
            sim.hr_rest = rest;
        }
        if let Some(peak) = self.peak {
            sim.hr_peak = peak;
        }
        if let Some(stress) = self.stress {
            sim.stress_level = stress;
        }
        if let Some(noise) = self.noise {
            sim.noise_level = noise;
        }
        if let Some(wander) = self.wander {
            sim.baseline_wander = wander;
        }
        if self.unseeded {
            sim.seed = None;
        } else if self.seed.is_some() {
            sim.seed = self.seed;
        }

        let filter = &mut config.filter;
        if self.no_filter {
            filter.enabled = false;
        }
        if let Some(lowcut) = self.lowcut {
            filter.lowcut = lowcut;
        }
        if let Some(highcut) = self.highcut {
            filter.highcut = highcut;
        }
        if let Some(order) = self.order {
            filter.order = order;
        }
    }

    fn resolve(&self) -> anyhow::Result<StudioConfig> {
        let mut config = match &self.config {
            Some(path) => StudioConfig::load(path)?,
            None => StudioConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve()?;

    if args.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let run = run_studio(&config)?;

    if let Some(path) = &args.csv {
        let file = File::create(path)
            .with_context(|| format!("creating CSV export {}", path.display()))?;
        run.write_csv(BufWriter::new(file))
            .with_context(|| format!("writing CSV export {}", path.display()))?;
        info!(path = %path.display(), rows = run.result.len(), "wrote CSV export");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        println!("{}", run.report);
    }

    Ok(())
}
