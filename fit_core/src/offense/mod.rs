//! Offense Aggregator - sustained damage output of active weapons
//!
//! `dps = damage_per_cycle × damage_multiplier / cycle_time` per weapon; the
//! fitting's DPS is the plain sum over weapons.

mod application;

pub use application::{
    missile_application, turret_application, turret_damage_multiplier, turret_hit_chance,
    MissileProfile, TargetProfile, TurretProfile, TRACKING_REFERENCE,
};

use crate::catalog::{attr, damage};
use crate::error::FitError;
use crate::fitting::SlotRef;
use crate::resolver::{ResolvedAttributes, ResolvedModule};
use crate::types::{DamageType, ModuleCategory, PerDamageType};
use serde::Serialize;

/// Damage output of one weapon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponStats {
    pub slot: SlotRef,
    pub name: String,
    pub category: ModuleCategory,
    pub cycle_time_secs: f64,
    /// Damage of a single cycle per type, multiplier included
    pub volley: PerDamageType,
    pub dps: PerDamageType,
    /// Fraction of damage applied to the target, when one was given
    pub application: Option<f64>,
}

impl WeaponStats {
    pub fn total_dps(&self) -> f64 {
        self.dps.sum()
    }

    pub fn total_volley(&self) -> f64 {
        self.volley.sum()
    }

    pub fn applied_dps(&self) -> Option<f64> {
        self.application.map(|a| a * self.total_dps())
    }
}

/// Damage output of a fitting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OffenseStats {
    pub weapons: Vec<WeaponStats>,
    pub dps: f64,
    pub volley: f64,
    pub dps_by_type: PerDamageType,
    /// DPS applied to the target; `None` without a target
    pub applied_dps: Option<f64>,
}

impl OffenseStats {
    pub fn is_armed(&self) -> bool {
        !self.weapons.is_empty()
    }
}

/// Compute DPS, volley and applied DPS of every active weapon
pub fn aggregate(
    resolved: &ResolvedAttributes,
    target: Option<&TargetProfile>,
) -> Result<OffenseStats, FitError> {
    let mut stats = OffenseStats::default();

    for module in resolved.active_modules() {
        if !module.category.is_offensive() {
            continue;
        }
        let weapon = weapon_stats(module, target)?;
        stats.dps_by_type = stats.dps_by_type.add(&weapon.dps);
        stats.volley += weapon.total_volley();
        stats.weapons.push(weapon);
    }

    stats.dps = stats.dps_by_type.sum();
    if target.is_some() {
        stats.applied_dps = Some(stats.weapons.iter().filter_map(WeaponStats::applied_dps).sum());
    }

    Ok(stats)
}

/// Damage output of a single active weapon
///
/// A weapon lacking a damage type attribute deals none of that type.
pub fn weapon_stats(module: &ResolvedModule, target: Option<&TargetProfile>) -> Result<WeaponStats, FitError> {
    let multiplier = module.value(attr::DAMAGE_MULTIPLIER)?;
    let cycle_time_secs = module.cycle_time_ms()? / 1000.0;

    let mut volley = PerDamageType::default();
    for dt in DamageType::all() {
        let base = module.attributes.get(damage(*dt)).unwrap_or(0.0);
        volley.set(*dt, base * multiplier);
    }
    let dps = if cycle_time_secs > 0.0 {
        volley.scale(1.0 / cycle_time_secs)
    } else {
        PerDamageType::default()
    };

    let application = match target {
        Some(target) => Some(weapon_application(module, target)?),
        None => None,
    };

    Ok(WeaponStats {
        slot: module.slot,
        name: module.name.clone(),
        category: module.category,
        cycle_time_secs,
        volley,
        dps,
        application,
    })
}

fn weapon_application(module: &ResolvedModule, target: &TargetProfile) -> Result<f64, FitError> {
    match module.category {
        ModuleCategory::Turret => {
            let turret = TurretProfile {
                tracking: module.value(attr::TRACKING_SPEED)?,
                optimal: module.value(attr::OPTIMAL_RANGE)?,
                falloff: module.value(attr::FALLOFF)?,
            };
            Ok(turret_application(&turret, target))
        }
        ModuleCategory::Launcher => {
            let missile = MissileProfile {
                explosion_radius: module.value(attr::EXPLOSION_RADIUS)?,
                explosion_velocity: module.value(attr::EXPLOSION_VELOCITY)?,
                damage_reduction_factor: module.value(attr::DAMAGE_REDUCTION_FACTOR)?,
            };
            Ok(missile_application(&missile, target))
        }
        _ => Ok(1.0),
    }
}
