//! Capacitor Simulator - fixed-step charge/discharge simulation
//!
//! Every step first deducts the activation cost of each module whose cycle
//! starts inside the step, then recharges exactly over the step. The run is
//! bounded by a horizon so it always terminates.

mod recharge;

pub use recharge::{peak_recharge_rate, recharge, recharge_rate, PEAK_RECHARGE_FACTOR};

use crate::catalog::attr;
use crate::config::CapacitorConstants;
use crate::error::FitError;
use crate::resolver::ResolvedAttributes;
use crate::stats::Warning;
use crate::types::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// When identical modules start their first cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Every module activates at t = 0
    #[default]
    Simultaneous,
    /// Identical modules are spread evenly over their cycle
    Staggered,
}

/// Stability classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Stability {
    /// Charge settles; fractions of capacity over the final window
    Stable { equilibrium: f64, low: f64, high: f64 },
    /// Charge runs out; `exact` is false when the horizon was hit instead
    Unstable { time_to_empty_secs: f64, exact: bool },
}

impl Stability {
    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable { .. })
    }

    pub fn time_to_empty(&self) -> Option<f64> {
        match self {
            Stability::Unstable { time_to_empty_secs, .. } => Some(*time_to_empty_secs),
            Stability::Stable { .. } => None,
        }
    }
}

/// Capacitor statistics of a fitting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacitorStats {
    pub capacity: f64,
    pub recharge_time_secs: f64,
    /// GJ/s at 25% charge
    pub peak_recharge_rate: f64,
    /// Sum of activation cost over cycle time of every active module, GJ/s
    pub average_drain: f64,
    pub active_users: usize,
    pub stability: Stability,
}

/// A module draining the capacitor
#[derive(Debug, Clone, Copy)]
struct Drain {
    type_id: TypeId,
    need: f64,
    period: f64,
    next: f64,
}

/// Minimum, maximum and mean charge over one stability window
#[derive(Debug, Clone, Copy)]
struct Window {
    low: f64,
    high: f64,
    sum: f64,
    samples: u64,
}

impl Window {
    fn new() -> Self {
        Window {
            low: f64::INFINITY,
            high: f64::NEG_INFINITY,
            sum: 0.0,
            samples: 0,
        }
    }

    fn mean(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.sum / self.samples as f64
    }
}

/// Run the capacitor simulation for the active modules of a fitting
pub fn simulate(
    resolved: &ResolvedAttributes,
    constants: &CapacitorConstants,
    policy: ActivationPolicy,
) -> Result<(CapacitorStats, Vec<Warning>), FitError> {
    let capacity = resolved.ship_value(attr::CAPACITOR_CAPACITY)?;
    let tau = resolved.ship_value(attr::CAPACITOR_RECHARGE_TIME)? / 1000.0;

    let mut drains = Vec::new();
    for module in resolved.active_modules() {
        let need = module.attributes.get(attr::CAPACITOR_NEED).unwrap_or(0.0);
        if need <= 0.0 {
            continue;
        }
        let period = module.cycle_time_ms()? / 1000.0;
        if period <= 0.0 {
            continue;
        }
        drains.push(Drain {
            type_id: module.type_id,
            need,
            period,
            next: 0.0,
        });
    }

    if policy == ActivationPolicy::Staggered {
        stagger(&mut drains);
    }

    let peak = peak_recharge_rate(capacity, tau);
    let average_drain: f64 = drains.iter().map(|d| d.need / d.period).sum();
    // A drain above the peak rate can only look settled while it is still sliding
    let can_settle = average_drain <= peak;

    let mut warnings = Vec::new();
    let stability = run(capacity, tau, &mut drains, can_settle, constants, &mut warnings);
    debug!(capacity, tau, users = drains.len(), ?stability, "capacitor simulated");

    let stats = CapacitorStats {
        capacity,
        recharge_time_secs: tau,
        peak_recharge_rate: peak,
        average_drain,
        active_users: drains.len(),
        stability,
    };
    Ok((stats, warnings))
}

/// Offset the first activation of identical modules evenly over their cycle
fn stagger(drains: &mut [Drain]) {
    let mut totals: HashMap<TypeId, usize> = HashMap::new();
    for drain in drains.iter() {
        *totals.entry(drain.type_id).or_default() += 1;
    }

    let mut seen: HashMap<TypeId, usize> = HashMap::new();
    for drain in drains.iter_mut() {
        let total = totals[&drain.type_id];
        let position = seen.entry(drain.type_id).or_default();
        drain.next = drain.period * *position as f64 / total as f64;
        *position += 1;
    }
}

fn run(
    capacity: f64,
    tau: f64,
    drains: &mut [Drain],
    can_settle: bool,
    constants: &CapacitorConstants,
    warnings: &mut Vec<Warning>,
) -> Stability {
    if drains.is_empty() {
        return Stability::Stable {
            equilibrium: 1.0,
            low: 1.0,
            high: 1.0,
        };
    }
    if capacity <= 0.0 {
        return Stability::Unstable {
            time_to_empty_secs: 0.0,
            exact: true,
        };
    }

    let step = constants.step_secs;
    let steps = (constants.horizon_secs / step).ceil() as u64;
    let window_steps = ((constants.stability_window_secs / step).round() as u64).max(1);
    let tolerance = constants.stability_tolerance * capacity;

    let mut level = capacity;
    let mut window = Window::new();
    let mut previous_low: Option<f64> = None;

    for i in 0..steps {
        let end = (i + 1) as f64 * step;
        for drain in drains.iter_mut() {
            while drain.next < end {
                level -= drain.need;
                if level <= 0.0 {
                    return Stability::Unstable {
                        time_to_empty_secs: drain.next,
                        exact: true,
                    };
                }
                drain.next += drain.period;
            }
        }

        window.low = window.low.min(level);
        level = recharge(level, capacity, tau, step);
        window.high = window.high.max(level);
        window.sum += level;
        window.samples += 1;

        if (i + 1) % window_steps == 0 {
            if let Some(previous) = previous_low.filter(|_| can_settle) {
                if window.low >= previous - tolerance {
                    return Stability::Stable {
                        equilibrium: window.mean() / capacity,
                        low: window.low / capacity,
                        high: window.high / capacity,
                    };
                }
            }
            previous_low = Some(window.low);
            window = Window::new();
        }
    }

    warn!(horizon_secs = constants.horizon_secs, "capacitor simulation hit its horizon");
    warnings.push(Warning::SimulationHorizonExceeded {
        horizon_secs: constants.horizon_secs,
    });
    Stability::Unstable {
        time_to_empty_secs: constants.horizon_secs,
        exact: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeSet;
    use crate::fitting::SlotRef;
    use crate::resolver::ResolvedModule;
    use crate::types::{ModuleCategory, ModuleState};

    fn user(index: u8, type_id: u32, need: f64, duration_ms: f64) -> ResolvedModule {
        ResolvedModule {
            slot: SlotRef::mid(index),
            type_id: TypeId(type_id),
            name: format!("Module {}", type_id),
            category: ModuleCategory::Other,
            state: ModuleState::Active,
            attributes: AttributeSet::new()
                .with(attr::CAPACITOR_NEED, need)
                .with(attr::DURATION, duration_ms),
        }
    }

    fn ship(capacity: f64, recharge_ms: f64, modules: Vec<ResolvedModule>) -> ResolvedAttributes {
        ResolvedAttributes {
            hull: TypeId(1),
            ship: AttributeSet::new()
                .with(attr::CAPACITOR_CAPACITY, capacity)
                .with(attr::CAPACITOR_RECHARGE_TIME, recharge_ms),
            modules,
        }
    }

    fn constants() -> CapacitorConstants {
        CapacitorConstants::default()
    }

    #[test]
    fn test_no_users_is_fully_stable() {
        let (stats, warnings) =
            simulate(&ship(1000.0, 100_000.0, vec![]), &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert_eq!(
            stats.stability,
            Stability::Stable {
                equilibrium: 1.0,
                low: 1.0,
                high: 1.0
            }
        );
        assert!(warnings.is_empty());
        assert_eq!(stats.average_drain, 0.0);
    }

    #[test]
    fn test_zero_capacity_with_users() {
        let res = ship(0.0, 100_000.0, vec![user(0, 5, 10.0, 5000.0)]);
        let (stats, _) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert_eq!(stats.stability.time_to_empty(), Some(0.0));
    }

    #[test]
    fn test_light_drain_is_stable() {
        // 2 GJ/s drain against a 25 GJ/s peak recharge
        let res = ship(1000.0, 100_000.0, vec![user(0, 5, 10.0, 5000.0)]);
        let (stats, warnings) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        match stats.stability {
            Stability::Stable { equilibrium, low, high } => {
                assert!(equilibrium > 0.25 && equilibrium < 1.0);
                assert!(low <= equilibrium && equilibrium <= high);
            }
            other => panic!("expected stable, got {:?}", other),
        }
        assert!(warnings.is_empty());
        assert!((stats.average_drain - 2.0).abs() < 1e-12);
        assert!((stats.peak_recharge_rate - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_heavy_drain_runs_dry() {
        // 50 GJ/s drain against a 25 GJ/s peak recharge
        let res = ship(1000.0, 100_000.0, vec![user(0, 5, 100.0, 2000.0)]);
        let (stats, _) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        match stats.stability {
            Stability::Unstable { time_to_empty_secs, exact } => {
                assert!(exact);
                assert!(time_to_empty_secs > 0.0);
                assert!(time_to_empty_secs < constants().horizon_secs);
            }
            other => panic!("expected unstable, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_shorter_than_step_keeps_its_rate() {
        // 15 GJ every 0.5 s is 30 GJ/s against a 25 GJ/s peak
        let res = ship(1000.0, 100_000.0, vec![user(0, 5, 15.0, 500.0)]);
        let (stats, _) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert!((stats.average_drain - 30.0).abs() < 1e-12);
        match stats.stability {
            Stability::Unstable { time_to_empty_secs, exact } => {
                assert!(exact);
                assert!(time_to_empty_secs < constants().horizon_secs);
                // Activations land on half seconds
                assert_eq!((time_to_empty_secs * 2.0).fract(), 0.0);
            }
            other => panic!("expected unstable, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_cycle_time_is_not_a_user() {
        let res = ship(1000.0, 100_000.0, vec![user(0, 5, 15.0, 0.0)]);
        let (stats, _) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert_eq!(stats.active_users, 0);
        assert!(stats.stability.is_stable());
    }

    #[test]
    fn test_drain_barely_above_peak_never_settles() {
        // Peak is 2.5 * 1000 / 500 = 5 GJ/s
        let res = ship(1000.0, 500_000.0, vec![user(0, 5, 5.00005, 1000.0)]);
        let (stats, warnings) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert!((stats.peak_recharge_rate - 5.0).abs() < 1e-12);
        assert!(stats.average_drain > stats.peak_recharge_rate);
        assert!(!stats.stability.is_stable(), "got {:?}", stats.stability);
        if let Stability::Unstable { exact: false, .. } = stats.stability {
            assert_eq!(warnings.len(), 1);
        }
    }

    #[test]
    fn test_drain_just_below_peak_settles() {
        let res = ship(1000.0, 500_000.0, vec![user(0, 5, 4.5, 1000.0)]);
        let (stats, _) = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert!(stats.stability.is_stable(), "got {:?}", stats.stability);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let res = ship(
            400.0,
            150_000.0,
            vec![user(0, 5, 30.0, 4000.0), user(1, 6, 12.0, 2500.0)],
        );
        let a = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        let b = simulate(&res, &constants(), ActivationPolicy::Simultaneous).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_horizon_is_reported() {
        // A horizon of two windows cannot settle a cap that is still draining
        let short = CapacitorConstants {
            horizon_secs: 120.0,
            stability_window_secs: 60.0,
            ..constants()
        };
        let res = ship(100_000.0, 1_000_000.0, vec![user(0, 5, 100.0, 1000.0)]);
        let (stats, warnings) = simulate(&res, &short, ActivationPolicy::Simultaneous).unwrap();
        assert_eq!(
            stats.stability,
            Stability::Unstable {
                time_to_empty_secs: 120.0,
                exact: false
            }
        );
        assert_eq!(warnings, vec![Warning::SimulationHorizonExceeded { horizon_secs: 120.0 }]);
    }

    #[test]
    fn test_staggering_spreads_identical_modules() {
        let mut drains = vec![
            Drain { type_id: TypeId(5), need: 1.0, period: 4.0, next: 0.0 },
            Drain { type_id: TypeId(5), need: 1.0, period: 4.0, next: 0.0 },
            Drain { type_id: TypeId(6), need: 1.0, period: 3.0, next: 0.0 },
        ];
        stagger(&mut drains);
        assert_eq!(drains[0].next, 0.0);
        assert_eq!(drains[1].next, 2.0);
        assert_eq!(drains[2].next, 0.0);
    }
}
