//! Compute pipeline - resolve a fitting, then run the aggregators in parallel

use crate::capacitor::{self, ActivationPolicy};
use crate::catalog::ReferenceData;
use crate::config::EngineConstants;
use crate::defense::{self, DamageProfile};
use crate::error::FitError;
use crate::fitting::Fitting;
use crate::mobility;
use crate::offense::{self, TargetProfile};
use crate::resolver::{self, ResolvedAttributes};
use crate::skills::SkillSet;
use crate::stats::{ComputedStats, Warning};
use crate::types::Revision;
use tracing::debug;

/// Caller choices that shape a computation without being part of the fitting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputeOptions {
    pub damage_profile: DamageProfile,
    /// Target for applied DPS; stationary DPS only when absent
    pub target: Option<TargetProfile>,
    pub activation: ActivationPolicy,
}

/// Compute every statistic of a fitting
pub fn compute<R: ReferenceData + ?Sized>(
    reference: &R,
    fitting: &Fitting,
    skills: &SkillSet,
    constants: &EngineConstants,
    options: &ComputeOptions,
    revision: Revision,
) -> Result<ComputedStats, FitError> {
    let resolved = resolver::resolve(reference, fitting, skills, &constants.stacking)?;
    aggregate_all(&resolved, constants, options, revision)
}

/// Compute every statistic, abandoning after resolution if `superseded` says so
///
/// Returns `None` when abandoned.
pub fn compute_unless<R, F>(
    reference: &R,
    fitting: &Fitting,
    skills: &SkillSet,
    constants: &EngineConstants,
    options: &ComputeOptions,
    revision: Revision,
    superseded: F,
) -> Option<Result<ComputedStats, FitError>>
where
    R: ReferenceData + ?Sized,
    F: Fn() -> bool,
{
    let resolved = match resolver::resolve(reference, fitting, skills, &constants.stacking) {
        Ok(resolved) => resolved,
        Err(e) => return Some(Err(e)),
    };

    if superseded() {
        debug!(%revision, "abandoning superseded computation after resolution");
        return None;
    }

    Some(aggregate_all(&resolved, constants, options, revision))
}

/// Run the four aggregators in parallel and merge their outputs
fn aggregate_all(
    resolved: &ResolvedAttributes,
    constants: &EngineConstants,
    options: &ComputeOptions,
    revision: Revision,
) -> Result<ComputedStats, FitError> {
    let ((defense, offense), (capacitor, (mobility, targeting))) = rayon::join(
        || {
            rayon::join(
                || defense::aggregate(resolved, &options.damage_profile, &constants.defense),
                || offense::aggregate(resolved, options.target.as_ref()),
            )
        },
        || {
            rayon::join(
                || capacitor::simulate(resolved, &constants.capacitor, options.activation),
                || {
                    (
                        mobility::mobility(resolved),
                        mobility::targeting(resolved, &constants.targeting),
                    )
                },
            )
        },
    );

    merge(revision, defense, offense, capacitor, mobility, targeting)
}

fn merge(
    revision: Revision,
    defense: Result<(defense::DefenseStats, Vec<Warning>), FitError>,
    offense: Result<offense::OffenseStats, FitError>,
    capacitor: Result<(capacitor::CapacitorStats, Vec<Warning>), FitError>,
    mobility: Result<mobility::MobilityStats, FitError>,
    targeting: Result<mobility::TargetingStats, FitError>,
) -> Result<ComputedStats, FitError> {
    let (defense, mut warnings) = defense?;
    let offense = offense?;
    let (capacitor, capacitor_warnings) = capacitor?;
    warnings.extend(capacitor_warnings);

    Ok(ComputedStats {
        revision,
        defense,
        offense,
        capacitor,
        mobility: mobility?,
        targeting: targeting?,
        warnings,
    })
}
