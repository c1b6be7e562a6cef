//! Tank sustain - passive shield regeneration and active repair rates

use crate::catalog::{attr, AttributeId};
use crate::error::FitError;
use crate::resolver::{ResolvedAttributes, ResolvedModule};
use crate::types::{Layer, ModuleCategory};
use serde::Serialize;

/// Shield regeneration peaks at 25% shield, at 2.5x the average rate
pub const PASSIVE_REGEN_PEAK_FACTOR: f64 = 2.5;

/// A hit point per second rate, raw and adjusted for resistances
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RepairRate {
    pub raw: f64,
    pub effective: f64,
}

/// Sustained tank of a fitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TankSustain {
    /// Peak passive shield regeneration; `None` without a shield recharge time
    pub passive_shield: Option<RepairRate>,
    pub shield_repair: RepairRate,
    pub armor_repair: RepairRate,
    pub hull_repair: RepairRate,
}

impl TankSustain {
    /// Combined active repair, effective HP/s
    pub fn active_effective(&self) -> f64 {
        self.shield_repair.effective + self.armor_repair.effective + self.hull_repair.effective
    }
}

/// Peak passive shield regeneration in HP/s
pub fn passive_shield_peak(shield_hp: f64, recharge_time_ms: f64) -> f64 {
    if shield_hp <= 0.0 || recharge_time_ms <= 0.0 {
        return 0.0;
    }
    PASSIVE_REGEN_PEAK_FACTOR * shield_hp / (recharge_time_ms / 1000.0)
}

/// Which layer a repair module restores and the attribute holding the amount
fn repaired_layer(category: ModuleCategory) -> Option<(Layer, AttributeId)> {
    match category {
        ModuleCategory::ShieldBooster => Some((Layer::Shield, attr::SHIELD_BONUS)),
        ModuleCategory::ArmorRepairer => Some((Layer::Armor, attr::ARMOR_DAMAGE_AMOUNT)),
        ModuleCategory::HullRepairer => Some((Layer::Hull, attr::STRUCTURE_DAMAGE_AMOUNT)),
        _ => None,
    }
}

/// Repair rate of one active module in HP/s
pub fn module_repair_rate(module: &ResolvedModule) -> Result<Option<(Layer, f64)>, FitError> {
    let Some((layer, amount_attr)) = repaired_layer(module.category) else {
        return Ok(None);
    };
    if !module.is_active() {
        return Ok(None);
    }
    let amount = module.value(amount_attr)?;
    let cycle_secs = module.cycle_time_ms()? / 1000.0;
    if cycle_secs <= 0.0 {
        return Ok(Some((layer, 0.0)));
    }
    Ok(Some((layer, amount / cycle_secs)))
}

/// Sum repair rates per layer
///
/// `multiplier` converts raw HP into effective HP for a layer under the
/// chosen damage profile.
pub fn tank_sustain(
    resolved: &ResolvedAttributes,
    multiplier: impl Fn(Layer) -> f64,
) -> Result<TankSustain, FitError> {
    let mut sustain = TankSustain::default();

    if let Some(recharge) = resolved.ship.get(attr::SHIELD_RECHARGE_TIME) {
        let shield = resolved.ship_value(attr::SHIELD_CAPACITY)?;
        let raw = passive_shield_peak(shield, recharge);
        sustain.passive_shield = Some(RepairRate {
            raw,
            effective: raw * multiplier(Layer::Shield),
        });
    }

    for module in &resolved.modules {
        if let Some((layer, raw)) = module_repair_rate(module)? {
            let rate = match layer {
                Layer::Shield => &mut sustain.shield_repair,
                Layer::Armor => &mut sustain.armor_repair,
                Layer::Hull => &mut sustain.hull_repair,
            };
            rate.raw += raw;
            rate.effective += raw * multiplier(layer);
        }
    }

    Ok(sustain)
}
