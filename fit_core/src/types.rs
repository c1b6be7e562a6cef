//! Core identifiers and enums shared across the engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a hull or module type in the reference data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a character skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub u32);

/// Monotonically increasing version number of a fitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub u64);

impl Revision {
    pub fn next(self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Kind of fitting slot on a hull
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    High,
    Mid,
    Low,
    Rig,
    Drone,
}

impl SlotKind {
    /// Get all slot kinds, in fitting order
    pub fn all() -> &'static [SlotKind] {
        &[
            SlotKind::High,
            SlotKind::Mid,
            SlotKind::Low,
            SlotKind::Rig,
            SlotKind::Drone,
        ]
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotKind::High => "high",
            SlotKind::Mid => "mid",
            SlotKind::Low => "low",
            SlotKind::Rig => "rig",
            SlotKind::Drone => "drone",
        };
        f.write_str(name)
    }
}

/// What a module does, used for effect targeting and aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    Turret,
    Launcher,
    Drone,
    ShieldBooster,
    ArmorRepairer,
    HullRepairer,
    Other,
}

impl ModuleCategory {
    /// Whether modules of this category deal damage
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            ModuleCategory::Turret | ModuleCategory::Launcher | ModuleCategory::Drone
        )
    }
}

/// Operating state of a fitted module
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    Offline,
    #[default]
    Online,
    Active,
}

impl ModuleState {
    pub fn is_online(&self) -> bool {
        !matches!(self, ModuleState::Offline)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ModuleState::Active)
    }
}

/// The four canonical damage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Em,
    Thermal,
    Kinetic,
    Explosive,
}

impl DamageType {
    pub const COUNT: usize = 4;

    /// Get all damage types, in canonical order
    pub fn all() -> &'static [DamageType; 4] {
        &[
            DamageType::Em,
            DamageType::Thermal,
            DamageType::Kinetic,
            DamageType::Explosive,
        ]
    }

    /// Position in per-type arrays
    pub fn index(&self) -> usize {
        match self {
            DamageType::Em => 0,
            DamageType::Thermal => 1,
            DamageType::Kinetic => 2,
            DamageType::Explosive => 3,
        }
    }
}

/// Defensive hit point layer, damaged outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Shield,
    Armor,
    Hull,
}

impl Layer {
    pub fn all() -> &'static [Layer; 3] {
        &[Layer::Shield, Layer::Armor, Layer::Hull]
    }
}

/// A value per damage type, indexed by [`DamageType::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDamageType(pub [f64; 4]);

impl PerDamageType {
    pub fn splat(value: f64) -> Self {
        PerDamageType([value; 4])
    }

    pub fn get(&self, damage_type: DamageType) -> f64 {
        self.0[damage_type.index()]
    }

    pub fn set(&mut self, damage_type: DamageType, value: f64) {
        self.0[damage_type.index()] = value;
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn scale(&self, factor: f64) -> Self {
        PerDamageType(self.0.map(|v| v * factor))
    }

    pub fn add(&self, other: &PerDamageType) -> Self {
        let mut out = *self;
        for (slot, v) in out.0.iter_mut().zip(other.0.iter()) {
            *slot += v;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_next() {
        assert_eq!(Revision(4).next(), Revision(5));
    }

    #[test]
    fn test_damage_type_indices_are_dense() {
        for (i, dt) in DamageType::all().iter().enumerate() {
            assert_eq!(dt.index(), i);
        }
    }

    #[test]
    fn test_per_damage_type_sum_and_scale() {
        let mut v = PerDamageType::default();
        v.set(DamageType::Kinetic, 10.0);
        v.set(DamageType::Thermal, 5.0);
        assert!((v.sum() - 15.0).abs() < f64::EPSILON);
        assert!((v.scale(2.0).get(DamageType::Kinetic) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_module_state_flags() {
        assert!(!ModuleState::Offline.is_online());
        assert!(ModuleState::Online.is_online());
        assert!(!ModuleState::Online.is_active());
        assert!(ModuleState::Active.is_online());
    }
}
