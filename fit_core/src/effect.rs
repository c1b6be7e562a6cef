//! Effect - the closed modifier type contributed by hulls, modules and skills

use crate::catalog::AttributeId;
use crate::error::FitError;
use crate::types::ModuleCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an effect modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    /// The ship's own attributes
    Ship,
    /// Every fitted module of a category
    Category(ModuleCategory),
}

/// How an effect combines with the value it modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `value += x`
    Add,
    /// `value *= 1 + x / 100`
    Percent,
    /// `value *= x`
    Multiply,
    /// `value = x`, applied last
    Assign,
}

impl Operation {
    /// Whether the operation is subject to stacking penalties
    pub fn is_multiplicative(&self) -> bool {
        matches!(self, Operation::Percent | Operation::Multiply)
    }
}

/// Category of bonuses that penalize each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackingGroup {
    ShieldResistance,
    ArmorResistance,
    HullResistance,
    DamageMultiplier,
    RateOfFire,
    Speed,
    Agility,
    SignatureRadius,
    CapacitorCapacity,
    CapacitorRecharge,
    ShieldCapacity,
    ArmorHp,
    Tracking,
    Range,
    Targeting,
    ScanResolution,
    RepairAmount,
}

impl StackingGroup {
    pub fn all() -> &'static [StackingGroup] {
        &[
            StackingGroup::ShieldResistance,
            StackingGroup::ArmorResistance,
            StackingGroup::HullResistance,
            StackingGroup::DamageMultiplier,
            StackingGroup::RateOfFire,
            StackingGroup::Speed,
            StackingGroup::Agility,
            StackingGroup::SignatureRadius,
            StackingGroup::CapacitorCapacity,
            StackingGroup::CapacitorRecharge,
            StackingGroup::ShieldCapacity,
            StackingGroup::ArmorHp,
            StackingGroup::Tracking,
            StackingGroup::Range,
            StackingGroup::Targeting,
            StackingGroup::ScanResolution,
            StackingGroup::RepairAmount,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StackingGroup::ShieldResistance => "shield_resistance",
            StackingGroup::ArmorResistance => "armor_resistance",
            StackingGroup::HullResistance => "hull_resistance",
            StackingGroup::DamageMultiplier => "damage_multiplier",
            StackingGroup::RateOfFire => "rate_of_fire",
            StackingGroup::Speed => "speed",
            StackingGroup::Agility => "agility",
            StackingGroup::SignatureRadius => "signature_radius",
            StackingGroup::CapacitorCapacity => "capacitor_capacity",
            StackingGroup::CapacitorRecharge => "capacitor_recharge",
            StackingGroup::ShieldCapacity => "shield_capacity",
            StackingGroup::ArmorHp => "armor_hp",
            StackingGroup::Tracking => "tracking",
            StackingGroup::Range => "range",
            StackingGroup::Targeting => "targeting",
            StackingGroup::ScanResolution => "scan_resolution",
            StackingGroup::RepairAmount => "repair_amount",
        }
    }
}

impl fmt::Display for StackingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StackingGroup {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StackingGroup::all()
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| FitError::UnknownStackingGroup(s.to_string()))
    }
}

/// Stacking behavior of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stacking {
    Unpenalized,
    Group(StackingGroup),
}

impl Stacking {
    /// Parse an optional stacking tag from reference data
    ///
    /// `None` and `"unpenalized"` both mean no penalty.
    pub fn from_tag(tag: Option<&str>) -> Result<Stacking, FitError> {
        match tag {
            None | Some("unpenalized") => Ok(Stacking::Unpenalized),
            Some(group) => Ok(Stacking::Group(group.parse()?)),
        }
    }
}

/// Where an effect's magnitude comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectValue {
    Fixed(f64),
    /// Read from an attribute of the item that carries the effect
    Attribute(AttributeId),
}

/// When an effect of a fitted module applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectCondition {
    #[default]
    Online,
    Active,
}

/// A single attribute modification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Effect {
    pub target: EffectTarget,
    pub attribute: AttributeId,
    pub operation: Operation,
    pub stacking: Stacking,
    pub value: EffectValue,
    pub condition: EffectCondition,
}

impl Effect {
    /// Create an unpenalized effect on a ship attribute
    pub fn ship(attribute: AttributeId, operation: Operation, value: f64) -> Self {
        Effect {
            target: EffectTarget::Ship,
            attribute,
            operation,
            stacking: Stacking::Unpenalized,
            value: EffectValue::Fixed(value),
            condition: EffectCondition::Online,
        }
    }

    /// Create an unpenalized effect on every module of a category
    pub fn modules(
        category: ModuleCategory,
        attribute: AttributeId,
        operation: Operation,
        value: f64,
    ) -> Self {
        Effect {
            target: EffectTarget::Category(category),
            ..Effect::ship(attribute, operation, value)
        }
    }

    /// Put this effect in a stacking group
    pub fn penalized(mut self, group: StackingGroup) -> Self {
        self.stacking = Stacking::Group(group);
        self
    }

    /// Read the magnitude from an attribute of the carrying item
    pub fn valued_by(mut self, source: AttributeId) -> Self {
        self.value = EffectValue::Attribute(source);
        self
    }

    /// Only apply while the carrying module is active
    pub fn when_active(mut self) -> Self {
        self.condition = EffectCondition::Active;
        self
    }

    /// Apply a per-level skill bonus `level` times
    ///
    /// Additive and percentage bonuses grow linearly, factors compound and
    /// assignments are left alone. Attribute-valued magnitudes are untouched.
    pub fn at_level(mut self, level: u8) -> Self {
        if let EffectValue::Fixed(v) = self.value {
            let n = f64::from(level);
            self.value = EffectValue::Fixed(match self.operation {
                Operation::Add | Operation::Percent => v * n,
                Operation::Multiply => v.powi(i32::from(level)),
                Operation::Assign => v,
            });
        }
        self
    }
}

/// Kind of item contributing an effect, in ascending assignment precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Hull,
    Skill,
    Module,
}

/// Stable ordering key of a contributed modifier
///
/// Used to break magnitude ties inside a stacking group and to pick the
/// winning assignment (the greatest key wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceKey {
    pub kind: SourceKind,
    /// Slot order for modules, list position for skills
    pub order: u32,
    /// Position of the effect in its item's effect list
    pub effect: u32,
}

impl SourceKey {
    pub fn new(kind: SourceKind, order: u32, effect: u32) -> Self {
        SourceKey { kind, order, effect }
    }
}
