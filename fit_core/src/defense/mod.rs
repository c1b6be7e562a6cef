//! Defense Aggregator - layered hit points and resistances to EHP
//!
//! Each layer (shield, armor, hull) is mitigated independently; total EHP is
//! the sum over layers.

mod profile;
mod repair;
mod resistance;

pub use profile::{DamageProfile, DamageProfileDef};
pub use repair::{passive_shield_peak, tank_sustain, RepairRate, TankSustain};
pub use resistance::{
    clamp_resistance, damage_taken_fraction, effective_hp, omni_hp, profile_hp,
    resistance_from_resonance, Clamp,
};

use crate::catalog::{layer_hp, resonance};
use crate::config::DefenseConstants;
use crate::error::FitError;
use crate::resolver::ResolvedAttributes;
use crate::stats::Warning;
use crate::types::{DamageType, Layer, PerDamageType};
use serde::Serialize;
use tracing::warn;

/// Mitigation of a single hit point layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerDefense {
    pub layer: Layer,
    pub hp: f64,
    /// Resistances after clamping
    pub resistances: PerDamageType,
    /// EHP against each pure damage type
    pub ehp: PerDamageType,
    pub omni_ehp: f64,
    pub profile_ehp: f64,
}

impl LayerDefense {
    /// Effective HP gained per raw HP under the chosen profile
    pub fn profile_multiplier(&self) -> f64 {
        if self.hp <= 0.0 {
            return 1.0;
        }
        self.profile_ehp / self.hp
    }
}

/// Defensive statistics of a fitting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseStats {
    /// Shield, armor, hull in that order
    pub layers: Vec<LayerDefense>,
    pub total_hp: f64,
    pub total_omni_ehp: f64,
    pub total_profile_ehp: f64,
    pub profile: DamageProfile,
    pub sustain: TankSustain,
}

impl DefenseStats {
    pub fn layer(&self, layer: Layer) -> Option<&LayerDefense> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    /// Total EHP against a single pure damage type
    pub fn total_ehp(&self, damage_type: DamageType) -> f64 {
        self.layers.iter().map(|l| l.ehp.get(damage_type)).sum()
    }
}

/// Compute layered EHP and tank sustain
///
/// Resistances outside `[0, max_resistance]` are clamped and reported as
/// warnings.
pub fn aggregate(
    resolved: &ResolvedAttributes,
    profile: &DamageProfile,
    constants: &DefenseConstants,
) -> Result<(DefenseStats, Vec<Warning>), FitError> {
    let mut warnings = Vec::new();
    let mut layers = Vec::with_capacity(3);

    for layer in Layer::all() {
        let hp = resolved.ship_value(layer_hp(*layer))?;

        let mut resistances = PerDamageType::default();
        let mut ehp = PerDamageType::default();
        for dt in DamageType::all() {
            let raw = resistance_from_resonance(resolved.ship_value(resonance(*layer, *dt))?);
            let (clamped, clamp) = clamp_resistance(raw, constants.max_resistance);
            if clamp.is_some() {
                warn!(layer = ?layer, damage_type = ?dt, raw, clamped, "resistance clamped");
                warnings.push(Warning::ResistanceClamped {
                    layer: *layer,
                    damage_type: *dt,
                    raw,
                    clamped,
                });
            }
            resistances.set(*dt, clamped);
            ehp.set(*dt, effective_hp(hp, clamped));
        }

        layers.push(LayerDefense {
            layer: *layer,
            hp,
            resistances,
            ehp,
            omni_ehp: omni_hp(hp, &resistances),
            profile_ehp: profile_hp(hp, &resistances, profile.weights()),
        });
    }

    let sustain = tank_sustain(resolved, |layer| {
        layers
            .iter()
            .find(|l| l.layer == layer)
            .map(LayerDefense::profile_multiplier)
            .unwrap_or(1.0)
    })?;

    let stats = DefenseStats {
        total_hp: layers.iter().map(|l| l.hp).sum(),
        total_omni_ehp: layers.iter().map(|l| l.omni_ehp).sum(),
        total_profile_ehp: layers.iter().map(|l| l.profile_ehp).sum(),
        layers,
        profile: *profile,
        sustain,
    };

    Ok((stats, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{attr, AttributeSet};
    use crate::types::TypeId;

    fn resolved(resonances: f64) -> ResolvedAttributes {
        let mut ship = AttributeSet::new()
            .with(attr::SHIELD_CAPACITY, 1000.0)
            .with(attr::ARMOR_HP, 500.0)
            .with(attr::STRUCTURE_HP, 250.0);
        for layer in Layer::all() {
            for dt in DamageType::all() {
                ship.insert(resonance(*layer, *dt), resonances);
            }
        }
        ResolvedAttributes {
            hull: TypeId(1),
            ship,
            modules: Vec::new(),
        }
    }

    #[test]
    fn test_zero_resistance_round_trip() {
        let (stats, warnings) =
            aggregate(&resolved(1.0), &DamageProfile::omni(), &DefenseConstants::default()).unwrap();
        assert!(warnings.is_empty());
        let shield = stats.layer(Layer::Shield).unwrap();
        for dt in DamageType::all() {
            assert!((shield.ehp.get(*dt) - 1000.0).abs() < 1e-9);
        }
        assert!((shield.omni_ehp - 1000.0).abs() < 1e-9);
        assert!((stats.total_omni_ehp - 1750.0).abs() < 1e-9);
        assert!(stats.sustain.passive_shield.is_none());
    }

    #[test]
    fn test_profile_weighting() {
        let mut res = resolved(1.0);
        res.ship.insert(attr::ARMOR_KINETIC_RESONANCE, 0.5);
        let kinetic = DamageProfile::pure(DamageType::Kinetic);
        let (stats, _) = aggregate(&res, &kinetic, &DefenseConstants::default()).unwrap();
        let armor = stats.layer(Layer::Armor).unwrap();
        assert!((armor.profile_ehp - 1000.0).abs() < 1e-9);
        assert!((stats.total_ehp(DamageType::Kinetic) - 2250.0).abs() < 1e-9);
    }

    #[test]
    fn test_resistances_are_clamped_with_warnings() {
        let mut res = resolved(1.0);
        res.ship.insert(attr::SHIELD_EM_RESONANCE, 0.0);
        res.ship.insert(attr::HULL_EM_RESONANCE, 1.5);
        let (stats, warnings) =
            aggregate(&res, &DamageProfile::omni(), &DefenseConstants::default()).unwrap();

        let shield = stats.layer(Layer::Shield).unwrap();
        assert!((shield.resistances.get(DamageType::Em) - 0.999).abs() < 1e-12);
        assert!(shield.ehp.get(DamageType::Em).is_finite());

        let hull = stats.layer(Layer::Hull).unwrap();
        assert_eq!(hull.resistances.get(DamageType::Em), 0.0);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_missing_resonance_is_an_error() {
        let mut res = resolved(1.0);
        res.ship = res
            .ship
            .iter()
            .filter(|(id, _)| *id != attr::ARMOR_THERMAL_RESONANCE)
            .collect();
        let err = aggregate(&res, &DamageProfile::omni(), &DefenseConstants::default()).unwrap_err();
        assert!(matches!(err, FitError::MissingAttribute { attribute, .. } if attribute == attr::ARMOR_THERMAL_RESONANCE));
    }
}
