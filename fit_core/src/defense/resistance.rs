//! Resistance - per-damage-type mitigation of a hit point layer
//!
//! Resistances are derived from resonances (`resistance = 1 - resonance`).
//!
//! Formula:
//! - `ehp = hp / (1 - resistance)` for a single damage type
//! - `ehp = hp / Σ w_i (1 - r_i)` for a damage profile with weights summing to 1

use crate::types::{DamageType, PerDamageType};

/// Which bound a clamped resistance hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clamp {
    Maximum,
    Negative,
}

/// Convert a resonance into a resistance
pub fn resistance_from_resonance(resonance: f64) -> f64 {
    1.0 - resonance
}

/// Clamp a resistance into `[0, max_resistance]`
///
/// Returns the clamped value and which bound was applied, if any.
pub fn clamp_resistance(resistance: f64, max_resistance: f64) -> (f64, Option<Clamp>) {
    if resistance > max_resistance {
        (max_resistance, Some(Clamp::Maximum))
    } else if resistance < 0.0 {
        (0.0, Some(Clamp::Negative))
    } else {
        (resistance, None)
    }
}

/// Effective hit points of a layer against a single damage type
pub fn effective_hp(hp: f64, resistance: f64) -> f64 {
    if hp <= 0.0 {
        return 0.0;
    }
    hp / (1.0 - resistance)
}

/// Effective hit points against an equal mix of all damage types
pub fn omni_hp(hp: f64, resistances: &PerDamageType) -> f64 {
    let weights = PerDamageType::splat(1.0 / DamageType::COUNT as f64);
    profile_hp(hp, resistances, &weights)
}

/// Effective hit points against a normalized damage profile
pub fn profile_hp(hp: f64, resistances: &PerDamageType, weights: &PerDamageType) -> f64 {
    if hp <= 0.0 {
        return 0.0;
    }
    hp / damage_taken_fraction(resistances, weights)
}

/// Fraction of incoming damage that gets through, `Σ w_i (1 - r_i)`
pub fn damage_taken_fraction(resistances: &PerDamageType, weights: &PerDamageType) -> f64 {
    DamageType::all()
        .iter()
        .map(|dt| weights.get(*dt) * (1.0 - resistances.get(*dt)))
        .sum()
}
