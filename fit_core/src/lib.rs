//! fit_core - Ship fitting calculation engine
//!
//! This library provides:
//! - Catalog: read-only reference data for hulls, modules and skills
//! - Resolver: stacking-penalized attribute resolution for a fitting
//! - Aggregators: defense (EHP), offense (DPS), capacitor stability, mobility
//! - FittingOrchestrator: background computation delivering the latest revision

pub mod capacitor;
pub mod catalog;
pub mod compute;
pub mod config;
pub mod defense;
pub mod effect;
pub mod error;
pub mod fitting;
pub mod mobility;
pub mod offense;
pub mod orchestrator;
pub mod prelude;
pub mod resolver;
pub mod skills;
pub mod stats;
pub mod types;

// Re-export core types for convenience
pub use capacitor::{ActivationPolicy, CapacitorStats, Stability};
pub use catalog::{attr, AttributeDef, AttributeId, AttributeSet, Catalog, Hull, ModuleType, ReferenceData, SkillType, SlotLayout};
pub use compute::{compute, compute_unless, ComputeOptions};
pub use config::{default_catalog, ConfigError, EngineConstants};
pub use defense::{DamageProfile, DefenseStats, LayerDefense};
pub use effect::{Effect, EffectCondition, EffectTarget, EffectValue, Operation, Stacking, StackingGroup};
pub use error::FitError;
pub use fitting::{FittedModule, Fitting, SlotRef};
pub use mobility::{MobilityStats, TargetingStats};
pub use offense::{OffenseStats, TargetProfile, WeaponStats};
pub use orchestrator::{Delivery, FittingOrchestrator, OrchestratorState};
pub use resolver::{resolve, ResolvedAttributes, ResolvedModule};
pub use skills::SkillSet;
pub use stats::{ComputedStats, Warning};
pub use types::{DamageType, Layer, ModuleCategory, ModuleState, PerDamageType, Revision, SkillId, SlotKind, TypeId};
