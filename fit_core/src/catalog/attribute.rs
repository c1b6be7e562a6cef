//! Attribute identifiers, definitions and attribute sets

use crate::error::FitError;
use crate::types::{DamageType, Layer, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Numeric attribute identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub u32);

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Well-known attribute ids read by the aggregators
///
/// Times are in milliseconds, distances in meters, velocities in m/s.
/// Resistances are stored as resonances (`1 - resistance`).
pub mod attr {
    use super::AttributeId;

    pub const MASS: AttributeId = AttributeId(4);
    pub const CAPACITOR_NEED: AttributeId = AttributeId(6);
    pub const STRUCTURE_HP: AttributeId = AttributeId(9);
    pub const MAX_VELOCITY: AttributeId = AttributeId(37);
    pub const RATE_OF_FIRE: AttributeId = AttributeId(51);
    pub const OPTIMAL_RANGE: AttributeId = AttributeId(54);
    pub const CAPACITOR_RECHARGE_TIME: AttributeId = AttributeId(55);
    pub const DAMAGE_MULTIPLIER: AttributeId = AttributeId(64);
    pub const SHIELD_BONUS: AttributeId = AttributeId(68);
    pub const AGILITY: AttributeId = AttributeId(70);
    pub const DURATION: AttributeId = AttributeId(73);
    pub const MAX_TARGET_RANGE: AttributeId = AttributeId(76);
    pub const STRUCTURE_DAMAGE_AMOUNT: AttributeId = AttributeId(83);
    pub const ARMOR_DAMAGE_AMOUNT: AttributeId = AttributeId(84);
    pub const HULL_KINETIC_RESONANCE: AttributeId = AttributeId(109);
    pub const HULL_THERMAL_RESONANCE: AttributeId = AttributeId(110);
    pub const HULL_EXPLOSIVE_RESONANCE: AttributeId = AttributeId(111);
    pub const HULL_EM_RESONANCE: AttributeId = AttributeId(113);
    pub const EM_DAMAGE: AttributeId = AttributeId(114);
    pub const EXPLOSIVE_DAMAGE: AttributeId = AttributeId(116);
    pub const KINETIC_DAMAGE: AttributeId = AttributeId(117);
    pub const THERMAL_DAMAGE: AttributeId = AttributeId(118);
    pub const FALLOFF: AttributeId = AttributeId(158);
    pub const TRACKING_SPEED: AttributeId = AttributeId(160);
    pub const MAX_LOCKED_TARGETS: AttributeId = AttributeId(192);
    pub const SHIELD_CAPACITY: AttributeId = AttributeId(263);
    pub const ARMOR_HP: AttributeId = AttributeId(265);
    pub const ARMOR_EM_RESONANCE: AttributeId = AttributeId(267);
    pub const ARMOR_EXPLOSIVE_RESONANCE: AttributeId = AttributeId(268);
    pub const ARMOR_KINETIC_RESONANCE: AttributeId = AttributeId(269);
    pub const ARMOR_THERMAL_RESONANCE: AttributeId = AttributeId(270);
    pub const SHIELD_EM_RESONANCE: AttributeId = AttributeId(271);
    pub const SHIELD_EXPLOSIVE_RESONANCE: AttributeId = AttributeId(272);
    pub const SHIELD_KINETIC_RESONANCE: AttributeId = AttributeId(273);
    pub const SHIELD_THERMAL_RESONANCE: AttributeId = AttributeId(274);
    pub const SHIELD_RECHARGE_TIME: AttributeId = AttributeId(479);
    pub const CAPACITOR_CAPACITY: AttributeId = AttributeId(482);
    pub const SIGNATURE_RADIUS: AttributeId = AttributeId(552);
    pub const SCAN_RESOLUTION: AttributeId = AttributeId(564);
    pub const OPTIMAL_SIG_RADIUS: AttributeId = AttributeId(620);
    pub const EXPLOSION_VELOCITY: AttributeId = AttributeId(653);
    pub const EXPLOSION_RADIUS: AttributeId = AttributeId(654);
    pub const DAMAGE_REDUCTION_FACTOR: AttributeId = AttributeId(1353);
}

/// Hit point attribute of a defensive layer
pub fn layer_hp(layer: Layer) -> AttributeId {
    match layer {
        Layer::Shield => attr::SHIELD_CAPACITY,
        Layer::Armor => attr::ARMOR_HP,
        Layer::Hull => attr::STRUCTURE_HP,
    }
}

/// Resonance attribute of a defensive layer for one damage type
pub fn resonance(layer: Layer, damage_type: DamageType) -> AttributeId {
    match (layer, damage_type) {
        (Layer::Shield, DamageType::Em) => attr::SHIELD_EM_RESONANCE,
        (Layer::Shield, DamageType::Thermal) => attr::SHIELD_THERMAL_RESONANCE,
        (Layer::Shield, DamageType::Kinetic) => attr::SHIELD_KINETIC_RESONANCE,
        (Layer::Shield, DamageType::Explosive) => attr::SHIELD_EXPLOSIVE_RESONANCE,
        (Layer::Armor, DamageType::Em) => attr::ARMOR_EM_RESONANCE,
        (Layer::Armor, DamageType::Thermal) => attr::ARMOR_THERMAL_RESONANCE,
        (Layer::Armor, DamageType::Kinetic) => attr::ARMOR_KINETIC_RESONANCE,
        (Layer::Armor, DamageType::Explosive) => attr::ARMOR_EXPLOSIVE_RESONANCE,
        (Layer::Hull, DamageType::Em) => attr::HULL_EM_RESONANCE,
        (Layer::Hull, DamageType::Thermal) => attr::HULL_THERMAL_RESONANCE,
        (Layer::Hull, DamageType::Kinetic) => attr::HULL_KINETIC_RESONANCE,
        (Layer::Hull, DamageType::Explosive) => attr::HULL_EXPLOSIVE_RESONANCE,
    }
}

/// Per-cycle damage attribute of a weapon for one damage type
pub fn damage(damage_type: DamageType) -> AttributeId {
    match damage_type {
        DamageType::Em => attr::EM_DAMAGE,
        DamageType::Thermal => attr::THERMAL_DAMAGE,
        DamageType::Kinetic => attr::KINETIC_DAMAGE,
        DamageType::Explosive => attr::EXPLOSIVE_DAMAGE,
    }
}

/// Reference definition of an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub id: AttributeId,
    pub name: String,
    /// Stackable attributes are never stacking-penalized
    #[serde(default)]
    pub stackable: bool,
}

impl AttributeDef {
    pub fn new(id: AttributeId, name: impl Into<String>) -> Self {
        AttributeDef {
            id,
            name: name.into(),
            stackable: false,
        }
    }

    pub fn stackable(mut self) -> Self {
        self.stackable = true;
        self
    }
}

/// Mapping attribute id -> numeric value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<AttributeId, f64>);

impl AttributeSet {
    pub fn new() -> Self {
        AttributeSet::default()
    }

    pub fn with(mut self, id: AttributeId, value: f64) -> Self {
        self.0.insert(id, value);
        self
    }

    pub fn insert(&mut self, id: AttributeId, value: f64) {
        self.0.insert(id, value);
    }

    pub fn get(&self, id: AttributeId) -> Option<f64> {
        self.0.get(&id).copied()
    }

    pub fn contains(&self, id: AttributeId) -> bool {
        self.0.contains_key(&id)
    }

    /// Get a value, failing with `MissingAttribute` when absent
    pub fn require(&self, owner: TypeId, id: AttributeId) -> Result<f64, FitError> {
        self.get(id).ok_or(FitError::MissingAttribute {
            type_id: owner,
            attribute: id,
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = AttributeId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeId, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(AttributeId, f64)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (AttributeId, f64)>>(iter: T) -> Self {
        AttributeSet(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_owner_and_attribute() {
        let set = AttributeSet::new().with(attr::ARMOR_HP, 400.0);
        assert!((set.require(TypeId(1), attr::ARMOR_HP).unwrap() - 400.0).abs() < f64::EPSILON);

        let err = set.require(TypeId(1), attr::SHIELD_CAPACITY).unwrap_err();
        assert_eq!(
            err,
            FitError::MissingAttribute {
                type_id: TypeId(1),
                attribute: attr::SHIELD_CAPACITY
            }
        );
    }

    #[test]
    fn test_resonance_ids_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for layer in Layer::all() {
            for dt in DamageType::all() {
                assert!(seen.insert(resonance(*layer, *dt)));
            }
        }
        assert_eq!(seen.len(), 12);
    }
}
