//! Damage application against a target profile
//!
//! Turrets roll to hit: `chance = 0.5^(tracking_term² + range_term²)` and the
//! expected damage includes wrecking shots. Missiles scale by signature and
//! velocity: `min(1, S/E, (S/E · Ve/Vt)^drf)`.

use serde::{Deserialize, Serialize};

/// Turret tracking reference distance, meters
pub const TRACKING_REFERENCE: f64 = 40_000.0;

/// Hits rolling below this chance are wrecking shots
pub const WRECKING_CHANCE: f64 = 0.01;

/// Damage multiplier of a wrecking shot
pub const WRECKING_MULTIPLIER: f64 = 3.0;

/// The ship being shot at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    /// Meters
    pub signature_radius: f64,
    /// m/s
    #[serde(default)]
    pub velocity: f64,
    /// rad/s relative to the shooter
    #[serde(default)]
    pub angular_velocity: f64,
    /// Meters
    #[serde(default)]
    pub distance: f64,
}

impl TargetProfile {
    /// A stationary target at point blank range
    pub fn stationary(signature_radius: f64) -> Self {
        TargetProfile {
            signature_radius,
            velocity: 0.0,
            angular_velocity: 0.0,
            distance: 0.0,
        }
    }
}

/// Weapon characteristics needed by the turret formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurretProfile {
    pub tracking: f64,
    pub optimal: f64,
    pub falloff: f64,
}

/// Missile characteristics needed by the missile formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissileProfile {
    pub explosion_radius: f64,
    pub explosion_velocity: f64,
    pub damage_reduction_factor: f64,
}

/// Probability that a turret shot hits
pub fn turret_hit_chance(turret: &TurretProfile, target: &TargetProfile) -> f64 {
    let tracking_term = if target.angular_velocity <= 0.0 {
        0.0
    } else if turret.tracking <= 0.0 || target.signature_radius <= 0.0 {
        return 0.0;
    } else {
        target.angular_velocity * TRACKING_REFERENCE / (turret.tracking * target.signature_radius)
    };

    let beyond_optimal = (target.distance - turret.optimal).max(0.0);
    let range_term = if beyond_optimal <= 0.0 {
        0.0
    } else if turret.falloff <= 0.0 {
        return 0.0;
    } else {
        beyond_optimal / turret.falloff
    };

    0.5f64.powf(tracking_term * tracking_term + range_term * range_term)
}

/// Expected damage multiplier of a turret shot for a given hit chance
///
/// The lowest rolls are wrecking shots; the remaining hits deal between
/// 50% and 149% damage.
pub fn turret_damage_multiplier(chance: f64) -> f64 {
    let chance = chance.clamp(0.0, 1.0);
    let wrecking = chance.min(WRECKING_CHANCE) * WRECKING_MULTIPLIER;
    let normal = (chance - WRECKING_CHANCE).max(0.0) * ((WRECKING_CHANCE + chance) / 2.0 + 0.49);
    wrecking + normal
}

/// Turret application including wrecking shots
pub fn turret_application(turret: &TurretProfile, target: &TargetProfile) -> f64 {
    turret_damage_multiplier(turret_hit_chance(turret, target))
}

/// Fraction of missile damage applied
pub fn missile_application(missile: &MissileProfile, target: &TargetProfile) -> f64 {
    if missile.explosion_radius <= 0.0 {
        return 1.0;
    }
    let sig_ratio = target.signature_radius.max(0.0) / missile.explosion_radius;
    let velocity_term = if target.velocity <= 0.0 {
        f64::INFINITY
    } else {
        (sig_ratio * missile.explosion_velocity / target.velocity).powf(missile.damage_reduction_factor)
    };
    1.0f64.min(sig_ratio).min(velocity_term)
}
