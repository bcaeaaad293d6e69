//! Single-beat ECG template built from Gaussian bumps in phase space

use bsp_core::CardiacPhase;
use std::f64::consts::TAU;

/// Characteristic deflections of one heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveKind {
    P,
    Q,
    R,
    S,
    T,
}

/// One Gaussian bump of the template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveComponent {
    pub kind: WaveKind,
    /// Phase at which the bump peaks (rad)
    pub center: f64,
    /// Peak voltage (a.u.), negative for downward deflections
    pub amplitude: f64,
    /// Standard deviation in phase (rad)
    pub width: f64,
}

impl WaveComponent {
    /// Contribution of this bump at a phase already reduced to `[0, 2π)`
    pub fn value_at(&self, phase_mod: f64) -> f64 {
        let offset = phase_mod - self.center;
        self.amplitude * (-(offset * offset) / (2.0 * self.width * self.width)).exp()
    }
}

/// P-QRS-T bumps; output compatibility depends on these exact values
pub const WAVE_COMPONENTS: [WaveComponent; 5] = [
    WaveComponent { kind: WaveKind::P, center: 0.80, amplitude: 0.10, width: 0.05 },
    WaveComponent { kind: WaveKind::Q, center: 1.10, amplitude: -0.15, width: 0.02 },
    WaveComponent { kind: WaveKind::R, center: 1.20, amplitude: 1.20, width: 0.01 },
    WaveComponent { kind: WaveKind::S, center: 1.25, amplitude: -0.25, width: 0.02 },
    WaveComponent { kind: WaveKind::T, center: 1.55, amplitude: 0.25, width: 0.08 },
];

/// Amplitude of the sinusoidal baseline riding under every beat
pub const TEMPLATE_BASELINE: f64 = 0.05;

/// ECG voltage contributed at a given cardiac phase (any real, taken mod 2π)
pub fn heartbeat_template(phase: f64) -> f64 {
    let phase_mod = phase.rem_euclid(TAU);
    let base = TEMPLATE_BASELINE * phase_mod.sin();

    WAVE_COMPONENTS
        .iter()
        .fold(base, |acc, component| acc + component.value_at(phase_mod))
}

/// Apply [`heartbeat_template`] to every phase sample
pub fn template_series(phase: &CardiacPhase) -> Vec<f64> {
    phase.iter().map(|&p| heartbeat_template(p)).collect()
}
