//! Capacitor recharge curve
//!
//! `dC/dt = 10·Cmax/τ · (√(C/Cmax) − C/Cmax)`, which integrates to
//! `C(t) = Cmax · (1 + (√(C0/Cmax) − 1) · e^(−5t/τ))²`.

/// Peak recharge rate as a multiple of `Cmax / τ`, reached at 25% charge
pub const PEAK_RECHARGE_FACTOR: f64 = 2.5;

/// Charge level after recharging for `dt` seconds
///
/// Exact for any step length; `tau` is the full recharge time in seconds.
pub fn recharge(level: f64, capacity: f64, tau: f64, dt: f64) -> f64 {
    if capacity <= 0.0 {
        return 0.0;
    }
    if tau <= 0.0 {
        return capacity;
    }
    let fraction = (level / capacity).clamp(0.0, 1.0);
    let root = 1.0 + (fraction.sqrt() - 1.0) * (-5.0 * dt / tau).exp();
    capacity * root * root
}

/// Instantaneous recharge rate at a charge level, GJ/s
pub fn recharge_rate(level: f64, capacity: f64, tau: f64) -> f64 {
    if capacity <= 0.0 || tau <= 0.0 {
        return 0.0;
    }
    let fraction = (level / capacity).clamp(0.0, 1.0);
    10.0 * capacity / tau * (fraction.sqrt() - fraction)
}

/// Highest possible recharge rate, GJ/s
pub fn peak_recharge_rate(capacity: f64, tau: f64) -> f64 {
    if capacity <= 0.0 || tau <= 0.0 {
        return 0.0;
    }
    PEAK_RECHARGE_FACTOR * capacity / tau
}
