//! Reference data loading
//!
//! Attributes are referred to by name everywhere except in their own
//! `[[attributes]]` table, which assigns the numeric ids.

use super::ConfigError;
use crate::catalog::{AttributeDef, AttributeId, AttributeSet, Catalog, Hull, ModuleType, SkillType, SlotLayout};
use crate::effect::{Effect, EffectCondition, EffectTarget, EffectValue, Operation, Stacking};
use crate::types::{ModuleCategory, SkillId, SlotKind, TypeId};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Container for a reference data file
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceFile {
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub hulls: Vec<HullDef>,
    #[serde(default)]
    pub modules: Vec<ModuleDef>,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HullDef {
    pub id: u32,
    pub name: String,
    pub slots: SlotsDef,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SlotsDef {
    #[serde(default)]
    pub high: u8,
    #[serde(default)]
    pub mid: u8,
    #[serde(default)]
    pub low: u8,
    #[serde(default)]
    pub rig: u8,
    #[serde(default)]
    pub drone: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDef {
    pub id: u32,
    pub name: String,
    pub slot: SlotKind,
    pub category: ModuleCategory,
    #[serde(default)]
    pub activatable: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, f64>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillDef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// An effect as written in reference data
#[derive(Debug, Clone, Deserialize)]
pub struct EffectDef {
    /// `"ship"` or a module category such as `"turret"`
    #[serde(default = "default_target")]
    pub target: String,
    pub attribute: String,
    pub operation: Operation,
    /// Literal magnitude
    pub value: Option<f64>,
    /// Name of an attribute of the carrying item holding the magnitude
    pub value_from: Option<String>,
    /// Stacking group tag; absent means unpenalized
    pub stacking: Option<String>,
    #[serde(default)]
    pub condition: EffectCondition,
}

fn default_target() -> String {
    "ship".to_string()
}

/// Load reference data from a TOML file
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let file: ReferenceFile = super::load_toml(path)?;
    build_catalog(file)
}

/// Load reference data from a TOML string
pub fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let file: ReferenceFile = super::parse_toml(content)?;
    build_catalog(file)
}

/// Get the reference data bundled with the crate
pub fn default_catalog() -> Result<Catalog, ConfigError> {
    let toml = include_str!("../../config/reference.toml");
    parse_catalog(toml)
}

fn build_catalog(file: ReferenceFile) -> Result<Catalog, ConfigError> {
    let mut names: HashMap<String, AttributeId> = HashMap::new();
    let mut catalog = Catalog::new();

    for def in file.attributes {
        if names.insert(def.name.clone(), def.id).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "attribute '{}' defined twice",
                def.name
            )));
        }
        catalog.add_attribute(def);
    }

    let mut seen = HashSet::new();
    for def in file.hulls {
        unique_name(&mut seen, "hull", &def.name)?;
        let slots = SlotLayout::new(def.slots.high, def.slots.mid, def.slots.low, def.slots.rig)
            .with_drones(def.slots.drone);
        let mut hull = Hull::new(TypeId(def.id), def.name, slots);
        hull.attributes = attribute_set(&names, &def.attributes)?;
        hull.effects = effects(&names, &def.effects)?;
        catalog.add_hull(hull);
    }

    seen.clear();
    for def in file.modules {
        unique_name(&mut seen, "module", &def.name)?;
        let mut module = ModuleType::new(TypeId(def.id), def.name, def.slot, def.category);
        module.activatable = def.activatable;
        module.attributes = attribute_set(&names, &def.attributes)?;
        module.effects = effects(&names, &def.effects)?;
        catalog.add_module(module);
    }

    seen.clear();
    for def in file.skills {
        unique_name(&mut seen, "skill", &def.name)?;
        let mut skill = SkillType::new(SkillId(def.id), def.name);
        skill.effects = effects(&names, &def.effects)?;
        catalog.add_skill(skill);
    }

    Ok(catalog)
}

fn unique_name(seen: &mut HashSet<String>, kind: &str, name: &str) -> Result<(), ConfigError> {
    if !seen.insert(name.to_string()) {
        return Err(ConfigError::ValidationError(format!("{} '{}' defined twice", kind, name)));
    }
    Ok(())
}

fn lookup(names: &HashMap<String, AttributeId>, name: &str) -> Result<AttributeId, ConfigError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| ConfigError::ValidationError(format!("unknown attribute '{}'", name)))
}

fn attribute_set(
    names: &HashMap<String, AttributeId>,
    values: &BTreeMap<String, f64>,
) -> Result<AttributeSet, ConfigError> {
    values
        .iter()
        .map(|(name, value)| Ok((lookup(names, name)?, *value)))
        .collect()
}

fn effects(names: &HashMap<String, AttributeId>, defs: &[EffectDef]) -> Result<Vec<Effect>, ConfigError> {
    defs.iter().map(|def| effect(names, def)).collect()
}

fn effect(names: &HashMap<String, AttributeId>, def: &EffectDef) -> Result<Effect, ConfigError> {
    let value = match (def.value, &def.value_from) {
        (Some(v), None) => EffectValue::Fixed(v),
        (None, Some(source)) => EffectValue::Attribute(lookup(names, source)?),
        _ => {
            return Err(ConfigError::ValidationError(format!(
                "effect on '{}' needs exactly one of value / value_from",
                def.attribute
            )))
        }
    };

    Ok(Effect {
        target: parse_target(&def.target)?,
        attribute: lookup(names, &def.attribute)?,
        operation: def.operation,
        stacking: Stacking::from_tag(def.stacking.as_deref())?,
        value,
        condition: def.condition,
    })
}

fn parse_target(target: &str) -> Result<EffectTarget, ConfigError> {
    let category = match target {
        "ship" => return Ok(EffectTarget::Ship),
        "turret" => ModuleCategory::Turret,
        "launcher" => ModuleCategory::Launcher,
        "drone" => ModuleCategory::Drone,
        "shield_booster" => ModuleCategory::ShieldBooster,
        "armor_repairer" => ModuleCategory::ArmorRepairer,
        "hull_repairer" => ModuleCategory::HullRepairer,
        "other" => ModuleCategory::Other,
        other => {
            return Err(ConfigError::ValidationError(format!(
                "unknown effect target '{}'",
                other
            )))
        }
    };
    Ok(EffectTarget::Category(category))
}
