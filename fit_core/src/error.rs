//! Engine error taxonomy

use crate::catalog::AttributeId;
use crate::types::{SkillId, SlotKind, TypeId};
use thiserror::Error;

/// Failure of a fitting computation
///
/// Every variant is a distinct condition the caller is expected to render
/// on its own terms (incomplete data vs. an over-fitted hull, for example).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("{type_id} has no base value for attribute {attribute}")]
    MissingAttribute { type_id: TypeId, attribute: AttributeId },

    #[error("type {0} is not present in the reference data")]
    UnknownType(TypeId),

    #[error("invalid slot assignment at {kind} slot {index}: {reason}")]
    InvalidSlotAssignment {
        kind: SlotKind,
        index: u8,
        reason: String,
    },

    #[error("unknown stacking group '{0}'")]
    UnknownStackingGroup(String),

    #[error("cyclic dependency while resolving attribute {attribute} of {type_id}")]
    CyclicAttributeDependency { type_id: TypeId, attribute: AttributeId },

    #[error("skill {skill:?} has invalid level {level} (expected 0-5)")]
    InvalidSkillLevel { skill: SkillId, level: u8 },

    #[error("computation task did not complete: {0}")]
    ComputationAborted(String),
}

impl FitError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            FitError::MissingAttribute { .. } => "missing_attribute",
            FitError::UnknownType(_) => "unknown_type",
            FitError::InvalidSlotAssignment { .. } => "invalid_slot_assignment",
            FitError::UnknownStackingGroup(_) => "unknown_stacking_group",
            FitError::CyclicAttributeDependency { .. } => "cyclic_attribute_dependency",
            FitError::InvalidSkillLevel { .. } => "invalid_skill_level",
            FitError::ComputationAborted(_) => "computation_aborted",
        }
    }
}
