//! Stacking penalty - diminishing returns for same-group multipliers
//!
//! The Nth-strongest modifier (0-indexed) of a chain is scaled by
//! `exp(-(N / denominator)^2)`; bonuses and penalties form separate chains.

use crate::effect::SourceKey;

/// Effectiveness of the modifier at `position` in a chain
pub fn penalty_factor(position: usize, denominator: f64) -> f64 {
    let n = position as f64 / denominator;
    (-(n * n)).exp()
}

/// Combined multiplier of a penalized chain
///
/// `fractions` are relative changes (`0.10` for +10%, `-0.25` for -25%).
/// The result does not depend on the input order.
pub fn penalized_multiplier(fractions: &[(f64, SourceKey)], denominator: f64) -> f64 {
    let mut bonuses: Vec<(f64, SourceKey)> = fractions.iter().copied().filter(|(f, _)| *f > 0.0).collect();
    let mut maluses: Vec<(f64, SourceKey)> = fractions.iter().copied().filter(|(f, _)| *f < 0.0).collect();

    // Strongest first, ties broken by source key
    bonuses.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    maluses.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    chain(&bonuses, denominator) * chain(&maluses, denominator)
}

fn chain(sorted: &[(f64, SourceKey)], denominator: f64) -> f64 {
    sorted
        .iter()
        .enumerate()
        .map(|(n, (fraction, _))| 1.0 + fraction * penalty_factor(n, denominator))
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::SourceKind;

    const DENOM: f64 = 2.22233;

    fn key(order: u32) -> SourceKey {
        SourceKey::new(SourceKind::Module, order, 0)
    }

    #[test]
    fn test_first_modifier_is_unpenalized() {
        assert!((penalty_factor(0, DENOM) - 1.0).abs() < f64::EPSILON);
        let m = penalized_multiplier(&[(0.25, key(0))], DENOM);
        assert!((m - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_penalty_sequence_decreases() {
        let mut previous = penalty_factor(0, DENOM);
        for n in 1..8 {
            let current = penalty_factor(n, DENOM);
            assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn test_three_ten_percent_bonuses() {
        let m = penalized_multiplier(&[(0.1, key(0)), (0.1, key(1)), (0.1, key(2))], DENOM);
        let expected = 1.1
            * (1.0 + 0.1 * (-(1.0f64 / DENOM).powi(2)).exp())
            * (1.0 + 0.1 * (-(2.0f64 / DENOM).powi(2)).exp());
        assert!((m - expected).abs() < 1e-12);
        assert!(m > 1.10 && m < 1.30);
    }

    #[test]
    fn test_strongest_gets_full_effect() {
        let m = penalized_multiplier(&[(0.1, key(0)), (0.3, key(1))], DENOM);
        let expected = 1.3 * (1.0 + 0.1 * penalty_factor(1, DENOM));
        assert!((m - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bonuses_and_penalties_chain_separately() {
        let m = penalized_multiplier(&[(0.2, key(0)), (-0.2, key(1))], DENOM);
        assert!((m - 1.2 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        assert!((penalized_multiplier(&[], DENOM) - 1.0).abs() < f64::EPSILON);
    }
}
