//! Lineage: a record of exactly how each cost unit's number was
//! produced, so a reviewer can trace a dollar figure back to the rate
//! and usage assumptions behind it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rate pulled directly from a pricing snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateDerivation {
    pub snapshot_id: String,
    pub rate_key: String,
    pub unit_rate: Decimal,
    pub unit: String,
}

/// A usage quantity, either read from configuration or assumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageDerivation {
    pub quantity: Decimal,
    pub unit: String,
    pub source: UsageSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageSource {
    /// Read directly from an attribute on the resource instance.
    Explicit,
    /// A mapper-supplied default (e.g. "assume 730 hours/month").
    Assumed(String),
}

/// A derived number built from an arithmetic combination of other
/// derivations (e.g. `unit_rate * hours_per_month * instance_count`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaDerivation {
    pub expression: String,
    pub inputs: Vec<Derivation>,
}

/// The union of every derivation kind a cost unit can carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Derivation {
    Rate(RateDerivation),
    Usage(UsageDerivation),
    Formula(Box<FormulaDerivation>),
}

impl Derivation {
    pub fn assumption_count(&self) -> usize {
        match self {
            Derivation::Rate(_) => 0,
            Derivation::Usage(usage) => match usage.source {
                UsageSource::Explicit => 0,
                UsageSource::Assumed(_) => 1,
            },
            Derivation::Formula(formula) => formula.inputs.iter().map(Derivation::assumption_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn explicit_usage_has_no_assumptions() {
        let d = Derivation::Usage(UsageDerivation {
            quantity: dec!(730),
            unit: "hour".into(),
            source: UsageSource::Explicit,
        });
        assert_eq!(d.assumption_count(), 0);
    }

    #[test]
    fn assumed_usage_counts_one_assumption() {
        let d = Derivation::Usage(UsageDerivation {
            quantity: dec!(730),
            unit: "hour".into(),
            source: UsageSource::Assumed("default hours/month".into()),
        });
        assert_eq!(d.assumption_count(), 1);
    }

    #[test]
    fn formula_sums_input_assumptions() {
        let rate = Derivation::Rate(RateDerivation {
            snapshot_id: "abc".into(),
            rate_key: "k".into(),
            unit_rate: dec!(0.1),
            unit: "hour".into(),
        });
        let usage = Derivation::Usage(UsageDerivation {
            quantity: dec!(730),
            unit: "hour".into(),
            source: UsageSource::Assumed("default".into()),
        });
        let formula = Derivation::Formula(Box::new(FormulaDerivation {
            expression: "rate * usage".into(),
            inputs: vec![rate, usage],
        }));
        assert_eq!(formula.assumption_count(), 1);
    }
}
