//! Attribute Catalog - read-only reference data for hulls, modules and skills
//!
//! Loaded once per session and shared by `Arc` across every computation.

mod attribute;

pub use attribute::{attr, damage, layer_hp, resonance, AttributeDef, AttributeId, AttributeSet};

use crate::effect::Effect;
use crate::types::{ModuleCategory, SkillId, SlotKind, TypeId};
use std::collections::HashMap;

/// Slot counts of a hull
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotLayout {
    pub high: u8,
    pub mid: u8,
    pub low: u8,
    pub rig: u8,
    pub drone: u8,
}

impl SlotLayout {
    pub fn new(high: u8, mid: u8, low: u8, rig: u8) -> Self {
        SlotLayout {
            high,
            mid,
            low,
            rig,
            drone: 0,
        }
    }

    pub fn with_drones(mut self, drone: u8) -> Self {
        self.drone = drone;
        self
    }

    /// Number of slots of a kind
    pub fn count(&self, kind: SlotKind) -> u8 {
        match kind {
            SlotKind::High => self.high,
            SlotKind::Mid => self.mid,
            SlotKind::Low => self.low,
            SlotKind::Rig => self.rig,
            SlotKind::Drone => self.drone,
        }
    }
}

/// Hull reference data
#[derive(Debug, Clone)]
pub struct Hull {
    pub id: TypeId,
    pub name: String,
    pub slots: SlotLayout,
    pub attributes: AttributeSet,
    /// Hull bonuses
    pub effects: Vec<Effect>,
}

impl Hull {
    pub fn new(id: TypeId, name: impl Into<String>, slots: SlotLayout) -> Self {
        Hull {
            id,
            name: name.into(),
            slots,
            attributes: AttributeSet::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, id: AttributeId, value: f64) -> Self {
        self.attributes.insert(id, value);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Module reference data
#[derive(Debug, Clone)]
pub struct ModuleType {
    pub id: TypeId,
    pub name: String,
    pub slot: SlotKind,
    pub category: ModuleCategory,
    /// Whether the module cycles when active
    pub activatable: bool,
    pub attributes: AttributeSet,
    pub effects: Vec<Effect>,
}

impl ModuleType {
    pub fn new(id: TypeId, name: impl Into<String>, slot: SlotKind, category: ModuleCategory) -> Self {
        ModuleType {
            id,
            name: name.into(),
            slot,
            category,
            activatable: false,
            attributes: AttributeSet::new(),
            effects: Vec::new(),
        }
    }

    pub fn activatable(mut self) -> Self {
        self.activatable = true;
        self
    }

    pub fn with_attribute(mut self, id: AttributeId, value: f64) -> Self {
        self.attributes.insert(id, value);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Skill reference data; effect magnitudes are per trained level
#[derive(Debug, Clone)]
pub struct SkillType {
    pub id: SkillId,
    pub name: String,
    pub effects: Vec<Effect>,
}

impl SkillType {
    pub fn new(id: SkillId, name: impl Into<String>) -> Self {
        SkillType {
            id,
            name: name.into(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Synchronous lookup of already-cached reference data
pub trait ReferenceData: Send + Sync {
    fn attribute(&self, id: AttributeId) -> Option<&AttributeDef>;

    fn hull(&self, id: TypeId) -> Option<&Hull>;

    fn module(&self, id: TypeId) -> Option<&ModuleType>;

    /// Base attributes of a hull or module
    fn attribute_catalog(&self, item: TypeId) -> Option<&AttributeSet> {
        self.hull(item)
            .map(|h| &h.attributes)
            .or_else(|| self.module(item).map(|m| &m.attributes))
    }

    /// Effects carried by a hull or module
    fn effects_of(&self, item: TypeId) -> &[Effect] {
        if let Some(hull) = self.hull(item) {
            return &hull.effects;
        }
        self.module(item).map(|m| m.effects.as_slice()).unwrap_or(&[])
    }

    /// Whether an attribute is exempt from stacking penalties
    fn is_stackable(&self, id: AttributeId) -> bool {
        self.attribute(id).map(|a| a.stackable).unwrap_or(false)
    }
}

/// In-memory reference data
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    attributes: HashMap<AttributeId, AttributeDef>,
    hulls: HashMap<TypeId, Hull>,
    modules: HashMap<TypeId, ModuleType>,
    skills: HashMap<SkillId, SkillType>,
    hull_names: HashMap<String, TypeId>,
    module_names: HashMap<String, TypeId>,
    skill_names: HashMap<String, SkillId>,
}

impl Catalog {
    pub fn new() -> Self {
        Catalog::default()
    }

    pub fn with_attribute(mut self, def: AttributeDef) -> Self {
        self.add_attribute(def);
        self
    }

    pub fn with_hull(mut self, hull: Hull) -> Self {
        self.add_hull(hull);
        self
    }

    pub fn with_module(mut self, module: ModuleType) -> Self {
        self.add_module(module);
        self
    }

    pub fn with_skill(mut self, skill: SkillType) -> Self {
        self.add_skill(skill);
        self
    }

    pub fn add_attribute(&mut self, def: AttributeDef) {
        self.attributes.insert(def.id, def);
    }

    /// Add a hull; a hull with the same name or id is replaced
    pub fn add_hull(&mut self, hull: Hull) {
        if let Some(prev) = self.hulls.get(&hull.id) {
            self.hull_names.remove(&prev.name);
        }
        if let Some(old) = self.hull_names.insert(hull.name.clone(), hull.id) {
            self.hulls.remove(&old);
        }
        self.hulls.insert(hull.id, hull);
    }

    /// Add a module type; a module with the same name or id is replaced
    pub fn add_module(&mut self, module: ModuleType) {
        if let Some(prev) = self.modules.get(&module.id) {
            self.module_names.remove(&prev.name);
        }
        if let Some(old) = self.module_names.insert(module.name.clone(), module.id) {
            self.modules.remove(&old);
        }
        self.modules.insert(module.id, module);
    }

    pub fn add_skill(&mut self, skill: SkillType) {
        if let Some(prev) = self.skills.get(&skill.id) {
            self.skill_names.remove(&prev.name);
        }
        if let Some(old) = self.skill_names.insert(skill.name.clone(), skill.id) {
            self.skills.remove(&old);
        }
        self.skills.insert(skill.id, skill);
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillType> {
        self.skills.get(&id)
    }

    /// Hulls, modules and skills each have their own name space
    pub fn find_hull(&self, name: &str) -> Option<TypeId> {
        self.hull_names.get(name).copied()
    }

    pub fn find_module(&self, name: &str) -> Option<TypeId> {
        self.module_names.get(name).copied()
    }

    pub fn find_skill(&self, name: &str) -> Option<SkillId> {
        self.skill_names.get(name).copied()
    }

    pub fn hulls(&self) -> impl Iterator<Item = &Hull> {
        self.hulls.values()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleType> {
        self.modules.values()
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillType> {
        self.skills.values()
    }
}

impl ReferenceData for Catalog {
    fn attribute(&self, id: AttributeId) -> Option<&AttributeDef> {
        self.attributes.get(&id)
    }

    fn hull(&self, id: TypeId) -> Option<&Hull> {
        self.hulls.get(&id)
    }

    fn module(&self, id: TypeId) -> Option<&ModuleType> {
        self.modules.get(&id)
    }
}
