//! Studio configuration file: simulation parameters plus filter settings

use anyhow::Context;
use bsp_processing::FilterConfig;
use bsp_simulation::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything one studio run needs. Missing tables or keys fall back to the
/// dashboard defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub simulation: SimulationConfig,
    pub filter: FilterConfig,
}

impl StudioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading studio config {}", path_ref.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("parsing studio config {}", path_ref.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: StudioConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("serializing studio config")
    }
}
