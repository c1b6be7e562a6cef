//! Damage profiles - relative weights of incoming damage types

use crate::types::{DamageType, PerDamageType};
use serde::{Deserialize, Serialize};

/// Normalized mix of incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageProfile {
    weights: PerDamageType,
}

impl DamageProfile {
    /// Equal parts of every damage type
    pub fn omni() -> Self {
        DamageProfile {
            weights: PerDamageType::splat(1.0 / DamageType::COUNT as f64),
        }
    }

    /// Profile of a single damage type
    pub fn pure(damage_type: DamageType) -> Self {
        let mut weights = PerDamageType::default();
        weights.set(damage_type, 1.0);
        DamageProfile { weights }
    }

    /// Build a profile from unnormalized weights (em, thermal, kinetic, explosive)
    ///
    /// Returns `None` when a weight is negative or not finite, or all are zero.
    pub fn new(em: f64, thermal: f64, kinetic: f64, explosive: f64) -> Option<Self> {
        let raw = PerDamageType([em, thermal, kinetic, explosive]);
        if raw.0.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return None;
        }
        let total = raw.sum();
        if total <= 0.0 {
            return None;
        }
        Some(DamageProfile {
            weights: raw.scale(1.0 / total),
        })
    }

    pub fn weight(&self, damage_type: DamageType) -> f64 {
        self.weights.get(damage_type)
    }

    pub fn weights(&self) -> &PerDamageType {
        &self.weights
    }
}

impl Default for DamageProfile {
    fn default() -> Self {
        DamageProfile::omni()
    }
}

/// Damage profile as written in configuration files
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DamageProfileDef {
    #[serde(default)]
    pub em: f64,
    #[serde(default)]
    pub thermal: f64,
    #[serde(default)]
    pub kinetic: f64,
    #[serde(default)]
    pub explosive: f64,
}

impl DamageProfileDef {
    pub fn build(&self) -> Option<DamageProfile> {
        DamageProfile::new(self.em, self.thermal, self.kinetic, self.explosive)
    }
}
