//! Modifier Resolver - turns a fitting into resolved attribute sets
//!
//! Every attribute of the ship and of each fitted module is resolved from
//! its base value and all effects targeting it (hull bonuses, skills and
//! fitted modules). Effect magnitudes read from attributes are resolved on
//! demand, so resolution is a depth-first walk with cycle detection.

mod attribute_value;
mod stacking;

pub use attribute_value::{resolve_value, AttributeValue, Modifier};
pub use stacking::{penalized_multiplier, penalty_factor};

use crate::catalog::{attr, AttributeId, AttributeSet, ReferenceData};
use crate::config::StackingConstants;
use crate::effect::{Effect, EffectCondition, EffectTarget, EffectValue, SourceKey, SourceKind};
use crate::error::FitError;
use crate::fitting::{Fitting, SlotRef};
use crate::skills::SkillSet;
use crate::types::{ModuleCategory, ModuleState, TypeId};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// A fitted module with its resolved attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    pub slot: SlotRef,
    pub type_id: TypeId,
    pub name: String,
    pub category: ModuleCategory,
    /// Effective state; passive modules never count as active
    pub state: ModuleState,
    pub attributes: AttributeSet,
}

impl ResolvedModule {
    pub fn value(&self, id: AttributeId) -> Result<f64, FitError> {
        self.attributes.require(self.type_id, id)
    }

    /// Cycle time in milliseconds (rate of fire for weapons, duration otherwise)
    pub fn cycle_time_ms(&self) -> Result<f64, FitError> {
        self.attributes
            .get(attr::RATE_OF_FIRE)
            .map(Ok)
            .unwrap_or_else(|| self.value(attr::DURATION))
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Final attribute values of one fitting computation
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttributes {
    pub hull: TypeId,
    pub ship: AttributeSet,
    pub modules: Vec<ResolvedModule>,
}

impl ResolvedAttributes {
    /// Get a ship attribute, failing with `MissingAttribute` when absent
    pub fn ship_value(&self, id: AttributeId) -> Result<f64, FitError> {
        self.ship.require(self.hull, id)
    }

    /// Active modules in activation order
    pub fn active_modules(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.iter().filter(|m| m.is_active())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Item {
    Ship,
    Module(usize),
}

struct ItemContext<'a> {
    type_id: TypeId,
    name: &'a str,
    slot: Option<SlotRef>,
    category: Option<ModuleCategory>,
    state: ModuleState,
    base: &'a AttributeSet,
}

/// An effect that applies to some item, indexed by target attribute
#[derive(Clone, Copy)]
struct Contribution<'a> {
    /// Item whose attributes feed attribute-valued effects
    source: Item,
    key: SourceKey,
    effect: &'a Effect,
}

struct Resolver<'a, R: ReferenceData + ?Sized> {
    reference: &'a R,
    constants: &'a StackingConstants,
    items: HashMap<Item, ItemContext<'a>>,
    module_count: usize,
    index: HashMap<AttributeId, Vec<Contribution<'a>>>,
    cache: HashMap<(Item, AttributeId), f64>,
    in_progress: HashSet<(Item, AttributeId)>,
}

/// Resolve every attribute of the ship and its fitted modules
///
/// The fitting is validated against the hull's slot layout first. Skill
/// effects carry literal magnitudes; an attribute-valued skill effect reads
/// the attribute from the ship.
pub fn resolve<R: ReferenceData + ?Sized>(
    reference: &R,
    fitting: &Fitting,
    skills: &SkillSet,
    constants: &StackingConstants,
) -> Result<ResolvedAttributes, FitError> {
    fitting.validate(reference)?;

    let mut resolver = Resolver::new(reference, fitting, skills, constants)?;

    let ship = resolver.resolve_item(Item::Ship)?;
    let mut modules = Vec::with_capacity(resolver.module_count);
    for i in 0..resolver.module_count {
        let attributes = resolver.resolve_item(Item::Module(i))?;
        let ctx = &resolver.items[&Item::Module(i)];
        modules.push(ResolvedModule {
            slot: ctx.slot.unwrap_or(SlotRef::high(0)),
            type_id: ctx.type_id,
            name: ctx.name.to_string(),
            category: ctx.category.unwrap_or(ModuleCategory::Other),
            state: ctx.state,
            attributes,
        });
    }

    debug!(
        hull = fitting.hull.0,
        modules = modules.len(),
        ship_attributes = ship.len(),
        "resolved fitting attributes"
    );

    Ok(ResolvedAttributes {
        hull: fitting.hull,
        ship,
        modules,
    })
}

impl<'a, R: ReferenceData + ?Sized> Resolver<'a, R> {
    fn new(
        reference: &'a R,
        fitting: &'a Fitting,
        skills: &'a SkillSet,
        constants: &'a StackingConstants,
    ) -> Result<Self, FitError> {
        let hull = reference
            .hull(fitting.hull)
            .ok_or(FitError::UnknownType(fitting.hull))?;

        let mut items = HashMap::new();
        let mut index: HashMap<AttributeId, Vec<Contribution<'a>>> = HashMap::new();

        items.insert(
            Item::Ship,
            ItemContext {
                type_id: hull.id,
                name: &hull.name,
                slot: None,
                category: None,
                state: ModuleState::Online,
                base: &hull.attributes,
            },
        );
        for (i, effect) in hull.effects.iter().enumerate() {
            index.entry(effect.attribute).or_default().push(Contribution {
                source: Item::Ship,
                key: SourceKey::new(SourceKind::Hull, 0, i as u32),
                effect,
            });
        }

        for (i, effect) in skills.effects().iter().enumerate() {
            index.entry(effect.attribute).or_default().push(Contribution {
                source: Item::Ship,
                key: SourceKey::new(SourceKind::Skill, i as u32, 0),
                effect,
            });
        }

        let mut module_count = 0;
        for (order, (slot, fitted)) in fitting.modules().enumerate() {
            let module = reference
                .module(fitted.type_id)
                .ok_or(FitError::UnknownType(fitted.type_id))?;

            let state = match fitted.state {
                ModuleState::Active if !module.activatable => ModuleState::Online,
                other => other,
            };

            items.insert(
                Item::Module(order),
                ItemContext {
                    type_id: module.id,
                    name: &module.name,
                    slot: Some(slot),
                    category: Some(module.category),
                    state,
                    base: &module.attributes,
                },
            );
            module_count += 1;

            for (i, effect) in module.effects.iter().enumerate() {
                let applies = match effect.condition {
                    EffectCondition::Online => state.is_online(),
                    EffectCondition::Active => state.is_active(),
                };
                if !applies {
                    continue;
                }
                index.entry(effect.attribute).or_default().push(Contribution {
                    source: Item::Module(order),
                    key: SourceKey::new(SourceKind::Module, order as u32, i as u32),
                    effect,
                });
            }
        }

        Ok(Resolver {
            reference,
            constants,
            items,
            module_count,
            index,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        })
    }

    /// Resolve the base attributes of an item plus every attribute targeted on it
    fn resolve_item(&mut self, item: Item) -> Result<AttributeSet, FitError> {
        let ctx = &self.items[&item];
        let mut needed: BTreeSet<AttributeId> = ctx.base.ids().collect();
        for (attribute, contributions) in &self.index {
            if contributions.iter().any(|c| self.targets(c.effect.target, item)) {
                needed.insert(*attribute);
            }
        }

        needed
            .into_iter()
            .map(|id| Ok((id, self.value(item, id)?)))
            .collect()
    }

    fn targets(&self, target: EffectTarget, item: Item) -> bool {
        match (target, item) {
            (EffectTarget::Ship, Item::Ship) => true,
            (EffectTarget::Category(category), Item::Module(_)) => {
                self.items[&item].category == Some(category)
            }
            _ => false,
        }
    }

    fn value(&mut self, item: Item, attribute: AttributeId) -> Result<f64, FitError> {
        if let Some(v) = self.cache.get(&(item, attribute)) {
            return Ok(*v);
        }

        if !self.in_progress.insert((item, attribute)) {
            return Err(FitError::CyclicAttributeDependency {
                type_id: self.items[&item].type_id,
                attribute,
            });
        }
        let result = self.compute(item, attribute);
        self.in_progress.remove(&(item, attribute));

        let value = result?;
        self.cache.insert((item, attribute), value);
        Ok(value)
    }

    fn compute(&mut self, item: Item, attribute: AttributeId) -> Result<f64, FitError> {
        let ctx = &self.items[&item];
        let base = ctx.base.require(ctx.type_id, attribute)?;

        let contributions: Vec<Contribution<'a>> = self
            .index
            .get(&attribute)
            .map(|all| {
                all.iter()
                    .copied()
                    .filter(|c| self.targets(c.effect.target, item))
                    .collect()
            })
            .unwrap_or_default();

        let stackable = self.reference.is_stackable(attribute);
        let mut value = AttributeValue::with_base(base);
        for contribution in contributions {
            let magnitude = match contribution.effect.value {
                EffectValue::Fixed(v) => v,
                EffectValue::Attribute(source) => self.value(contribution.source, source)?,
            };
            value.apply(
                Modifier::new(
                    contribution.effect.operation,
                    contribution.effect.stacking,
                    magnitude,
                    contribution.key,
                ),
                stackable,
            );
        }

        Ok(value.compute(self.constants.penalty_denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeDef, Catalog, Hull, ModuleType, SlotLayout};
    use crate::effect::{Operation, StackingGroup};
    use crate::types::SlotKind;

    const HULL: TypeId = TypeId(1);
    const GUN: TypeId = TypeId(10);
    const DAMAGE_MOD: TypeId = TypeId(11);
    const EXTENDER: TypeId = TypeId(12);
    const HARDENER: TypeId = TypeId(13);
    const BONUS: AttributeId = AttributeId(5000);

    fn catalog() -> Catalog {
        Catalog::new()
            .with_attribute(AttributeDef::new(attr::SHIELD_CAPACITY, "shield_capacity"))
            .with_hull(
                Hull::new(HULL, "Hull", SlotLayout::new(3, 3, 3, 0))
                    .with_attribute(attr::SHIELD_CAPACITY, 1000.0)
                    .with_attribute(attr::SHIELD_EM_RESONANCE, 1.0)
                    .with_effect(Effect::modules(
                        ModuleCategory::Turret,
                        attr::DAMAGE_MULTIPLIER,
                        Operation::Percent,
                        10.0,
                    )),
            )
            .with_module(
                ModuleType::new(GUN, "Gun", SlotKind::High, ModuleCategory::Turret)
                    .activatable()
                    .with_attribute(attr::DAMAGE_MULTIPLIER, 2.0)
                    .with_attribute(attr::RATE_OF_FIRE, 3000.0),
            )
            .with_module(
                ModuleType::new(DAMAGE_MOD, "Damage Mod", SlotKind::Low, ModuleCategory::Other)
                    .with_attribute(attr::DAMAGE_MULTIPLIER, 1.1)
                    .with_effect(
                        Effect::modules(ModuleCategory::Turret, attr::DAMAGE_MULTIPLIER, Operation::Multiply, 0.0)
                            .valued_by(attr::DAMAGE_MULTIPLIER)
                            .penalized(StackingGroup::DamageMultiplier),
                    ),
            )
            .with_module(
                ModuleType::new(EXTENDER, "Extender", SlotKind::Mid, ModuleCategory::Other)
                    .with_attribute(BONUS, 500.0)
                    .with_effect(Effect::ship(attr::SHIELD_CAPACITY, Operation::Add, 0.0).valued_by(BONUS)),
            )
            .with_module(
                ModuleType::new(HARDENER, "Hardener", SlotKind::Mid, ModuleCategory::Other)
                    .activatable()
                    .with_effect(
                        Effect::ship(attr::SHIELD_EM_RESONANCE, Operation::Percent, -50.0)
                            .penalized(StackingGroup::ShieldResistance)
                            .when_active(),
                    ),
            )
    }

    fn constants() -> StackingConstants {
        StackingConstants::default()
    }

    #[test]
    fn test_no_modifiers_keeps_base() {
        let cat = catalog();
        let resolved = resolve(&cat, &Fitting::new(HULL), &SkillSet::new(), &constants()).unwrap();
        assert_eq!(resolved.ship_value(attr::SHIELD_CAPACITY).unwrap(), 1000.0);
        assert!(resolved.modules.is_empty());
    }

    #[test]
    fn test_attribute_valued_effect() {
        let cat = catalog();
        let fit = Fitting::new(HULL).with_module(SlotRef::mid(0), EXTENDER, ModuleState::Online);
        let resolved = resolve(&cat, &fit, &SkillSet::new(), &constants()).unwrap();
        assert!((resolved.ship_value(attr::SHIELD_CAPACITY).unwrap() - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_offline_module_contributes_nothing() {
        let cat = catalog();
        let fit = Fitting::new(HULL).with_module(SlotRef::mid(0), EXTENDER, ModuleState::Offline);
        let resolved = resolve(&cat, &fit, &SkillSet::new(), &constants()).unwrap();
        assert_eq!(resolved.ship_value(attr::SHIELD_CAPACITY).unwrap(), 1000.0);
    }

    #[test]
    fn test_active_only_effect() {
        let cat = catalog();
        let online = Fitting::new(HULL).with_module(SlotRef::mid(0), HARDENER, ModuleState::Online);
        let active = Fitting::new(HULL).with_module(SlotRef::mid(0), HARDENER, ModuleState::Active);

        let r1 = resolve(&cat, &online, &SkillSet::new(), &constants()).unwrap();
        let r2 = resolve(&cat, &active, &SkillSet::new(), &constants()).unwrap();
        assert_eq!(r1.ship_value(attr::SHIELD_EM_RESONANCE).unwrap(), 1.0);
        assert!((r2.ship_value(attr::SHIELD_EM_RESONANCE).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_passive_module_cannot_be_active() {
        let cat = catalog();
        let fit = Fitting::new(HULL).with_module(SlotRef::low(0), DAMAGE_MOD, ModuleState::Active);
        let resolved = resolve(&cat, &fit, &SkillSet::new(), &constants()).unwrap();
        assert_eq!(resolved.modules[0].state, ModuleState::Online);
    }

    #[test]
    fn test_category_effects_reach_modules() {
        let cat = catalog();
        let fit = Fitting::new(HULL)
            .with_module(SlotRef::high(0), GUN, ModuleState::Active)
            .with_module(SlotRef::low(0), DAMAGE_MOD, ModuleState::Online)
            .with_module(SlotRef::low(1), DAMAGE_MOD, ModuleState::Online);
        let resolved = resolve(&cat, &fit, &SkillSet::new(), &constants()).unwrap();

        let gun = &resolved.modules[0];
        let expected = 2.0 * 1.1 * (1.1 * (1.0 + 0.1 * penalty_factor(1, 2.22233)));
        assert!((gun.value(attr::DAMAGE_MULTIPLIER).unwrap() - expected).abs() < 1e-9);
        assert!((gun.cycle_time_ms().unwrap() - 3000.0).abs() < f64::EPSILON);

        // The damage mods' own multiplier attribute is untouched
        assert!((resolved.modules[1].value(attr::DAMAGE_MULTIPLIER).unwrap() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_skill_effects_apply() {
        let cat = catalog();
        let skills = SkillSet::from_effects(vec![Effect::ship(attr::SHIELD_CAPACITY, Operation::Percent, 25.0)]);
        let resolved = resolve(&cat, &Fitting::new(HULL), &skills, &constants()).unwrap();
        assert!((resolved.ship_value(attr::SHIELD_CAPACITY).unwrap() - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_targeted_attribute() {
        let cat = catalog();
        let skills = SkillSet::from_effects(vec![Effect::ship(attr::ARMOR_HP, Operation::Percent, 5.0)]);
        let err = resolve(&cat, &Fitting::new(HULL), &skills, &constants()).unwrap_err();
        assert_eq!(
            err,
            FitError::MissingAttribute {
                type_id: HULL,
                attribute: attr::ARMOR_HP
            }
        );
    }

    #[test]
    fn test_cycle_is_detected() {
        let cat = catalog().with_hull(
            Hull::new(TypeId(2), "Loop", SlotLayout::new(0, 0, 0, 0))
                .with_attribute(attr::SHIELD_CAPACITY, 100.0)
                .with_attribute(attr::ARMOR_HP, 100.0)
                .with_effect(Effect::ship(attr::SHIELD_CAPACITY, Operation::Add, 0.0).valued_by(attr::ARMOR_HP))
                .with_effect(Effect::ship(attr::ARMOR_HP, Operation::Add, 0.0).valued_by(attr::SHIELD_CAPACITY)),
        );
        let err = resolve(&cat, &Fitting::new(TypeId(2)), &SkillSet::new(), &constants()).unwrap_err();
        assert!(matches!(err, FitError::CyclicAttributeDependency { .. }));
    }

    #[test]
    fn test_invalid_fitting_is_rejected_before_resolution() {
        let cat = catalog();
        let fit = Fitting::new(HULL).with_module(SlotRef::rig(0), EXTENDER, ModuleState::Online);
        assert!(matches!(
            resolve(&cat, &fit, &SkillSet::new(), &constants()),
            Err(FitError::InvalidSlotAssignment { .. })
        ));
    }
}
