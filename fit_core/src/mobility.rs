//! Mobility and targeting envelope

use crate::catalog::attr;
use crate::config::TargetingConstants;
use crate::error::FitError;
use crate::resolver::ResolvedAttributes;
use serde::Serialize;

/// Mass unit conversion used by the align time formula
const MASS_SCALE: f64 = 1_000_000.0;

/// Lock time numerator, seconds · mm
const LOCK_TIME_CONSTANT: f64 = 40_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MobilityStats {
    pub max_velocity: f64,
    pub mass: f64,
    pub agility: f64,
    /// Seconds to reach warp alignment (75% of max velocity)
    pub align_time_secs: f64,
    pub signature_radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LockTime {
    pub signature_radius: f64,
    pub seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetingStats {
    pub max_target_range: f64,
    pub scan_resolution: f64,
    pub max_locked_targets: f64,
    pub lock_times: Vec<LockTime>,
}

/// Seconds to align: `ln 4 · agility · mass / 10⁶`
pub fn align_time(agility: f64, mass: f64) -> f64 {
    4f64.ln() * agility * mass / MASS_SCALE
}

/// Seconds to lock a target: `40000 / (scan_res · asinh(sig)²)`
pub fn lock_time(scan_resolution: f64, signature_radius: f64) -> f64 {
    let spread = signature_radius.asinh();
    let denominator = scan_resolution * spread * spread;
    if denominator <= 0.0 {
        return f64::INFINITY;
    }
    LOCK_TIME_CONSTANT / denominator
}

pub fn mobility(resolved: &ResolvedAttributes) -> Result<MobilityStats, FitError> {
    let mass = resolved.ship_value(attr::MASS)?;
    let agility = resolved.ship_value(attr::AGILITY)?;
    Ok(MobilityStats {
        max_velocity: resolved.ship_value(attr::MAX_VELOCITY)?,
        mass,
        agility,
        align_time_secs: align_time(agility, mass),
        signature_radius: resolved.ship_value(attr::SIGNATURE_RADIUS)?,
    })
}

/// Targeting range, resolution and lock times against each reference signature
pub fn targeting(
    resolved: &ResolvedAttributes,
    constants: &TargetingConstants,
) -> Result<TargetingStats, FitError> {
    let scan_resolution = resolved.ship_value(attr::SCAN_RESOLUTION)?;
    let lock_times = constants
        .reference_signatures
        .iter()
        .map(|sig| LockTime {
            signature_radius: *sig,
            seconds: lock_time(scan_resolution, *sig),
        })
        .collect();

    Ok(TargetingStats {
        max_target_range: resolved.ship_value(attr::MAX_TARGET_RANGE)?,
        scan_resolution,
        max_locked_targets: resolved.ship_value(attr::MAX_LOCKED_TARGETS)?,
        lock_times,
    })
}
