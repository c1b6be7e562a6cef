//! Fitting files - a hull, its modules and trained skills, written by name

use anyhow::{anyhow, bail, Context, Result};
use fit_core::defense::DamageProfileDef;
use fit_core::{
    Catalog, DamageProfile, Fitting, ModuleState, SkillId, SkillSet, SlotKind, SlotRef, TargetProfile,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A fitting as written on disk
#[derive(Debug, Clone, Deserialize)]
pub struct FittingFile {
    /// Hull name
    pub hull: String,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
    /// Skill name -> trained level
    #[serde(default)]
    pub skills: BTreeMap<String, u8>,
    /// Incoming damage mix; omni when absent
    pub profile: Option<DamageProfileDef>,
    /// Target for applied DPS
    pub target: Option<TargetProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleEntry {
    pub slot: SlotKind,
    /// Slot index; the next free index of the kind when omitted
    pub index: Option<u8>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub state: ModuleState,
}

/// A fitting file with every name resolved against the catalog
#[derive(Debug, Clone)]
pub struct LoadedFitting {
    pub name: String,
    pub fitting: Fitting,
    pub skills: SkillSet,
    pub profile: Option<DamageProfile>,
    pub target: Option<TargetProfile>,
}

impl FittingFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read fitting file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid fitting file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve hull, module and skill names to catalog ids
    pub fn resolve(&self, catalog: &Catalog) -> Result<LoadedFitting> {
        let hull = catalog
            .find_hull(&self.hull)
            .ok_or_else(|| anyhow!("unknown hull '{}'", self.hull))?;

        let mut fitting = Fitting::new(hull);
        let mut next_free: HashMap<SlotKind, u8> = HashMap::new();
        for entry in &self.modules {
            let type_id = catalog
                .find_module(&entry.type_name)
                .ok_or_else(|| anyhow!("unknown module '{}'", entry.type_name))?;

            let next = next_free.entry(entry.slot).or_insert(0);
            let index = entry.index.unwrap_or(*next);
            *next = (*next).max(index.saturating_add(1));

            let slot = SlotRef::new(entry.slot, index);
            if fitting.fit(slot, type_id, entry.state).is_some() {
                bail!("{} slot {} is fitted twice", entry.slot, index);
            }
        }

        let levels = self
            .skills
            .iter()
            .map(|(name, level)| {
                let skill = catalog
                    .find_skill(name)
                    .ok_or_else(|| anyhow!("unknown skill '{}'", name))?;
                Ok((skill, *level))
            })
            .collect::<Result<Vec<(SkillId, u8)>>>()?;
        let skills = SkillSet::from_levels(catalog, levels)?;

        let profile = match &self.profile {
            Some(def) => Some(def.build().ok_or_else(|| anyhow!("damage profile needs positive weights"))?),
            None => None,
        };

        debug!(hull = %self.hull, modules = fitting.module_count(), "fitting file resolved");
        Ok(LoadedFitting {
            name: self.hull.clone(),
            fitting,
            skills,
            profile,
            target: self.target,
        })
    }
}
