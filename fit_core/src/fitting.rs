//! Fitting - a hull plus modules mapped to slots

use crate::catalog::ReferenceData;
use crate::error::FitError;
use crate::types::{ModuleState, SlotKind, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single slot on a hull
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub kind: SlotKind,
    pub index: u8,
}

impl SlotRef {
    pub fn new(kind: SlotKind, index: u8) -> Self {
        SlotRef { kind, index }
    }

    pub fn high(index: u8) -> Self {
        SlotRef::new(SlotKind::High, index)
    }

    pub fn mid(index: u8) -> Self {
        SlotRef::new(SlotKind::Mid, index)
    }

    pub fn low(index: u8) -> Self {
        SlotRef::new(SlotKind::Low, index)
    }

    pub fn rig(index: u8) -> Self {
        SlotRef::new(SlotKind::Rig, index)
    }

    pub fn drone(index: u8) -> Self {
        SlotRef::new(SlotKind::Drone, index)
    }
}

/// A module instance occupying a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedModule {
    pub type_id: TypeId,
    pub state: ModuleState,
}

/// A hull and its fitted modules
///
/// Modules are kept ordered by slot; that order is also the activation
/// order used by the capacitor simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitting {
    pub hull: TypeId,
    modules: BTreeMap<SlotRef, FittedModule>,
}

impl Fitting {
    pub fn new(hull: TypeId) -> Self {
        Fitting {
            hull,
            modules: BTreeMap::new(),
        }
    }

    /// Builder-style [`Fitting::fit`]
    pub fn with_module(mut self, slot: SlotRef, type_id: TypeId, state: ModuleState) -> Self {
        self.fit(slot, type_id, state);
        self
    }

    /// Put a module in a slot, returning whatever was there before
    pub fn fit(&mut self, slot: SlotRef, type_id: TypeId, state: ModuleState) -> Option<FittedModule> {
        self.modules.insert(slot, FittedModule { type_id, state })
    }

    /// Empty a slot
    pub fn remove(&mut self, slot: SlotRef) -> Option<FittedModule> {
        self.modules.remove(&slot)
    }

    /// Change the state of a fitted module; returns false if the slot is empty
    pub fn set_state(&mut self, slot: SlotRef, state: ModuleState) -> bool {
        match self.modules.get_mut(&slot) {
            Some(module) => {
                module.state = state;
                true
            }
            None => false,
        }
    }

    pub fn module(&self, slot: SlotRef) -> Option<&FittedModule> {
        self.modules.get(&slot)
    }

    /// Fitted modules in slot order
    pub fn modules(&self) -> impl Iterator<Item = (SlotRef, &FittedModule)> {
        self.modules.iter().map(|(slot, m)| (*slot, m))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Check every module against the hull's slot layout
    ///
    /// Fails with `UnknownType` for ids absent from the reference data and
    /// `InvalidSlotAssignment` when a slot does not exist on the hull or a
    /// module sits in a slot of the wrong kind.
    pub fn validate<R: ReferenceData + ?Sized>(&self, reference: &R) -> Result<(), FitError> {
        let hull = reference
            .hull(self.hull)
            .ok_or(FitError::UnknownType(self.hull))?;

        for (slot, fitted) in self.modules() {
            let module = reference
                .module(fitted.type_id)
                .ok_or(FitError::UnknownType(fitted.type_id))?;

            let available = hull.slots.count(slot.kind);
            if slot.index >= available {
                return Err(FitError::InvalidSlotAssignment {
                    kind: slot.kind,
                    index: slot.index,
                    reason: format!("{} has {} {} slots", hull.name, available, slot.kind),
                });
            }

            if module.slot != slot.kind {
                return Err(FitError::InvalidSlotAssignment {
                    kind: slot.kind,
                    index: slot.index,
                    reason: format!("{} requires a {} slot", module.name, module.slot),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Hull, ModuleType, SlotLayout};
    use crate::types::ModuleCategory;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_hull(Hull::new(TypeId(1), "Frigate", SlotLayout::new(2, 1, 1, 0)))
            .with_module(ModuleType::new(
                TypeId(10),
                "Gun",
                SlotKind::High,
                ModuleCategory::Turret,
            ))
            .with_module(ModuleType::new(
                TypeId(11),
                "Plate",
                SlotKind::Low,
                ModuleCategory::Other,
            ))
    }

    #[test]
    fn test_valid_fitting() {
        let fit = Fitting::new(TypeId(1))
            .with_module(SlotRef::high(0), TypeId(10), ModuleState::Active)
            .with_module(SlotRef::high(1), TypeId(10), ModuleState::Active)
            .with_module(SlotRef::low(0), TypeId(11), ModuleState::Online);
        assert!(fit.validate(&catalog()).is_ok());
    }

    #[test]
    fn test_slot_beyond_layout_is_rejected() {
        let fit = Fitting::new(TypeId(1)).with_module(SlotRef::high(2), TypeId(10), ModuleState::Active);
        match fit.validate(&catalog()) {
            Err(FitError::InvalidSlotAssignment { kind, index, .. }) => {
                assert_eq!(kind, SlotKind::High);
                assert_eq!(index, 2);
            }
            other => panic!("expected InvalidSlotAssignment, got {:?}", other),
        }
    }

    #[test]
    fn test_rig_slot_on_hull_without_rigs() {
        let fit = Fitting::new(TypeId(1)).with_module(SlotRef::rig(0), TypeId(11), ModuleState::Online);
        assert!(matches!(
            fit.validate(&catalog()),
            Err(FitError::InvalidSlotAssignment { .. })
        ));
    }

    #[test]
    fn test_wrong_slot_kind_is_rejected() {
        let fit = Fitting::new(TypeId(1)).with_module(SlotRef::mid(0), TypeId(10), ModuleState::Online);
        assert!(matches!(
            fit.validate(&catalog()),
            Err(FitError::InvalidSlotAssignment { .. })
        ));
    }

    #[test]
    fn test_unknown_ids() {
        let fit = Fitting::new(TypeId(2));
        assert_eq!(fit.validate(&catalog()), Err(FitError::UnknownType(TypeId(2))));

        let fit = Fitting::new(TypeId(1)).with_module(SlotRef::high(0), TypeId(99), ModuleState::Online);
        assert_eq!(fit.validate(&catalog()), Err(FitError::UnknownType(TypeId(99))));
    }

    #[test]
    fn test_fit_replaces_and_modules_are_slot_ordered() {
        let mut fit = Fitting::new(TypeId(1));
        fit.fit(SlotRef::low(0), TypeId(11), ModuleState::Online);
        fit.fit(SlotRef::high(1), TypeId(10), ModuleState::Online);
        let previous = fit.fit(SlotRef::high(1), TypeId(10), ModuleState::Active);
        assert_eq!(previous.map(|m| m.state), Some(ModuleState::Online));

        let slots: Vec<SlotRef> = fit.modules().map(|(s, _)| s).collect();
        assert_eq!(slots, vec![SlotRef::high(1), SlotRef::low(0)]);

        assert!(fit.set_state(SlotRef::low(0), ModuleState::Offline));
        assert!(!fit.set_state(SlotRef::mid(0), ModuleState::Offline));
        assert!(fit.remove(SlotRef::low(0)).is_some());
        assert_eq!(fit.module_count(), 1);
    }
}
