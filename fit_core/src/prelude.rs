//! Prelude module for convenient imports
//!
//! ```rust
//! use fit_core::prelude::*;
//! ```

// Reference data
pub use crate::catalog::{attr, Catalog, ReferenceData};
pub use crate::config::{default_catalog, EngineConstants};

// Fitting input
pub use crate::fitting::{Fitting, SlotRef};
pub use crate::skills::SkillSet;
pub use crate::types::{DamageType, Layer, ModuleState, Revision, SkillId, TypeId};

// Computation
pub use crate::compute::{compute, ComputeOptions};
pub use crate::orchestrator::{Delivery, FittingOrchestrator};

// Results
pub use crate::capacitor::Stability;
pub use crate::defense::DamageProfile;
pub use crate::error::FitError;
pub use crate::offense::TargetProfile;
pub use crate::stats::{ComputedStats, Warning};
