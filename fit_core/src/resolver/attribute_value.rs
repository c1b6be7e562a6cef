//! AttributeValue - accumulates the modifiers targeting one attribute
//!
//! Final value is calculated as:
//! `(base + Σ add) × Π unpenalized × Π penalized_group`, then the winning
//! assignment (if any) overrides the result.

use super::stacking::penalized_multiplier;
use crate::effect::{Operation, SourceKey, Stacking, StackingGroup};
use std::collections::BTreeMap;

/// A modifier with its magnitude already resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifier {
    pub operation: Operation,
    pub stacking: Stacking,
    pub value: f64,
    pub key: SourceKey,
}

impl Modifier {
    pub fn new(operation: Operation, stacking: Stacking, value: f64, key: SourceKey) -> Self {
        Modifier {
            operation,
            stacking,
            value,
            key,
        }
    }

    /// The multiplicative factor this modifier stands for
    fn factor(&self) -> f64 {
        match self.operation {
            Operation::Percent => 1.0 + self.value / 100.0,
            _ => self.value,
        }
    }
}

/// Modifier buckets for one attribute
#[derive(Debug, Clone, Default)]
pub struct AttributeValue {
    pub base: f64,
    additions: Vec<(f64, SourceKey)>,
    multipliers: Vec<(f64, SourceKey)>,
    penalized: BTreeMap<StackingGroup, Vec<(f64, SourceKey)>>,
    assignments: Vec<(f64, SourceKey)>,
}

impl AttributeValue {
    /// Create a new AttributeValue with the given base
    pub fn with_base(base: f64) -> Self {
        AttributeValue {
            base,
            ..AttributeValue::default()
        }
    }

    /// Sort a modifier into its bucket
    ///
    /// Stackable attributes ignore stacking groups. Only multiplicative
    /// operations are ever penalized.
    pub fn apply(&mut self, modifier: Modifier, stackable: bool) {
        match modifier.operation {
            Operation::Add => self.additions.push((modifier.value, modifier.key)),
            Operation::Assign => self.assignments.push((modifier.value, modifier.key)),
            Operation::Percent | Operation::Multiply => match modifier.stacking {
                Stacking::Group(group) if !stackable => self
                    .penalized
                    .entry(group)
                    .or_default()
                    .push((modifier.factor() - 1.0, modifier.key)),
                _ => self.multipliers.push((modifier.factor(), modifier.key)),
            },
        }
    }

    /// Calculate the resolved value
    pub fn compute(&self, penalty_denominator: f64) -> f64 {
        if let Some((value, _)) = self.assignments.iter().max_by_key(|(_, key)| *key) {
            return *value;
        }

        let mut additions = self.additions.clone();
        sort_by_value(&mut additions);
        let added: f64 = additions.iter().map(|(v, _)| v).sum();

        let mut multipliers = self.multipliers.clone();
        sort_by_value(&mut multipliers);
        let unpenalized: f64 = multipliers.iter().map(|(v, _)| v).product();

        let penalized: f64 = self
            .penalized
            .values()
            .map(|chain| penalized_multiplier(chain, penalty_denominator))
            .product();

        (self.base + added) * unpenalized * penalized
    }
}

/// Resolve a base value against a set of modifiers in one call
pub fn resolve_value(base: f64, modifiers: &[Modifier], stackable: bool, penalty_denominator: f64) -> f64 {
    let mut value = AttributeValue::with_base(base);
    for modifier in modifiers {
        value.apply(*modifier, stackable);
    }
    value.compute(penalty_denominator)
}

// Summation and products are order-sensitive in floating point; sorting
// makes the result independent of the order modifiers were collected in.
fn sort_by_value(values: &mut [(f64, SourceKey)]) {
    values.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
}
