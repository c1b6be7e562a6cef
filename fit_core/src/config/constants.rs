//! Engine constants configuration

use serde::{Deserialize, Serialize};

/// Tunable engine constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConstants {
    #[serde(default)]
    pub stacking: StackingConstants,
    #[serde(default)]
    pub defense: DefenseConstants,
    #[serde(default)]
    pub capacitor: CapacitorConstants,
    #[serde(default)]
    pub targeting: TargetingConstants,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingConstants {
    /// Nth modifier in a group is scaled by `exp(-(N / denominator)^2)`
    #[serde(default = "default_penalty_denominator")]
    pub penalty_denominator: f64,
}

impl Default for StackingConstants {
    fn default() -> Self {
        StackingConstants {
            penalty_denominator: default_penalty_denominator(),
        }
    }
}

fn default_penalty_denominator() -> f64 {
    2.22233
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseConstants {
    /// Resistances above this fraction are clamped to it
    #[serde(default = "default_max_resistance")]
    pub max_resistance: f64,
}

impl Default for DefenseConstants {
    fn default() -> Self {
        DefenseConstants {
            max_resistance: default_max_resistance(),
        }
    }
}

fn default_max_resistance() -> f64 {
    0.999
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitorConstants {
    /// Simulated seconds per step
    #[serde(default = "default_step_secs")]
    pub step_secs: f64,
    /// Simulation stops after this many simulated seconds
    #[serde(default = "default_horizon_secs")]
    pub horizon_secs: f64,
    /// Length of the trailing windows compared to detect convergence
    #[serde(default = "default_stability_window_secs")]
    pub stability_window_secs: f64,
    /// Allowed drop of the window minimum, as a fraction of capacity
    #[serde(default = "default_stability_tolerance")]
    pub stability_tolerance: f64,
}

impl Default for CapacitorConstants {
    fn default() -> Self {
        CapacitorConstants {
            step_secs: default_step_secs(),
            horizon_secs: default_horizon_secs(),
            stability_window_secs: default_stability_window_secs(),
            stability_tolerance: default_stability_tolerance(),
        }
    }
}

fn default_step_secs() -> f64 {
    1.0
}
fn default_horizon_secs() -> f64 {
    6.0 * 3600.0
}
fn default_stability_window_secs() -> f64 {
    3600.0
}
fn default_stability_tolerance() -> f64 {
    0.001
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingConstants {
    /// Signature radii (m) lock times are reported against
    #[serde(default = "default_reference_signatures")]
    pub reference_signatures: Vec<f64>,
}

impl Default for TargetingConstants {
    fn default() -> Self {
        TargetingConstants {
            reference_signatures: default_reference_signatures(),
        }
    }
}

fn default_reference_signatures() -> Vec<f64> {
    vec![35.0, 125.0, 400.0]
}
