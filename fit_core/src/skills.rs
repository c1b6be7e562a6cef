//! SkillSet - character skill levels and the effects they contribute

use crate::catalog::Catalog;
use crate::effect::Effect;
use crate::error::FitError;
use crate::types::SkillId;
use std::collections::BTreeMap;
use tracing::debug;

/// Highest trainable skill level
pub const MAX_SKILL_LEVEL: u8 = 5;

/// Trained skills and their already-resolved effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSet {
    levels: BTreeMap<SkillId, u8>,
    effects: Vec<Effect>,
}

impl SkillSet {
    /// No skills trained
    pub fn new() -> Self {
        SkillSet::default()
    }

    /// Skills whose effects were resolved by an external mapping
    pub fn from_effects(effects: Vec<Effect>) -> Self {
        SkillSet {
            levels: BTreeMap::new(),
            effects,
        }
    }

    /// Resolve skill levels through the catalog's per-level skill table
    ///
    /// Each literal effect is applied once per trained level, see
    /// [`Effect::at_level`].
    /// Skills missing from the catalog contribute nothing.
    pub fn from_levels<I>(catalog: &Catalog, levels: I) -> Result<Self, FitError>
    where
        I: IntoIterator<Item = (SkillId, u8)>,
    {
        let mut set = SkillSet::new();
        for (skill, level) in levels {
            if level > MAX_SKILL_LEVEL {
                return Err(FitError::InvalidSkillLevel { skill, level });
            }
            set.levels.insert(skill, level);
        }

        for (skill, level) in &set.levels {
            if *level == 0 {
                continue;
            }
            match catalog.skill(*skill) {
                Some(def) => set
                    .effects
                    .extend(def.effects.iter().map(|e| e.clone().at_level(*level))),
                None => debug!(skill = skill.0, "skill has no catalog entry, ignoring"),
            }
        }

        Ok(set)
    }

    pub fn level(&self, skill: SkillId) -> Option<u8> {
        self.levels.get(&skill).copied()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
