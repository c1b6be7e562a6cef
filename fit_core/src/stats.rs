//! ComputedStats - the immutable snapshot delivered for one fitting revision

use crate::capacitor::CapacitorStats;
use crate::defense::DefenseStats;
use crate::mobility::{MobilityStats, TargetingStats};
use crate::offense::OffenseStats;
use crate::types::{DamageType, Layer, Revision};
use serde::Serialize;
use std::fmt;

/// Non-fatal condition noticed while computing a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A resistance outside `[0, max]` was clamped
    ResistanceClamped {
        layer: Layer,
        damage_type: DamageType,
        raw: f64,
        clamped: f64,
    },
    /// The capacitor simulation neither converged nor depleted
    SimulationHorizonExceeded { horizon_secs: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ResistanceClamped {
                layer,
                damage_type,
                raw,
                clamped,
            } => write!(
                f,
                "{:?} {:?} resistance {:.1}% clamped to {:.1}%",
                layer,
                damage_type,
                raw * 100.0,
                clamped * 100.0
            ),
            Warning::SimulationHorizonExceeded { horizon_secs } => write!(
                f,
                "capacitor simulation did not settle within {:.0} s",
                horizon_secs
            ),
        }
    }
}

/// Every derived statistic of one fitting revision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStats {
    pub revision: Revision,
    pub defense: DefenseStats,
    pub offense: OffenseStats,
    pub capacitor: CapacitorStats,
    pub mobility: MobilityStats,
    pub targeting: TargetingStats,
    pub warnings: Vec<Warning>,
}

impl ComputedStats {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
