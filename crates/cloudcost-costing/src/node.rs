//! A cost node: every [`CostUnit`] belonging to one resource instance,
//! folded into a subtotal with propagated confidence.

use crate::confidence::Confidence;
use crate::unit::CostUnit;
use cloudcost_core::{Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostNode {
    pub instance_address: String,
    pub resource_type: String,
    pub units: Vec<CostUnit>,
    pub subtotal: Money,
    pub confidence: Confidence,
    pub assumption_count: usize,
}

impl CostNode {
    /// Folds a set of cost units for a single instance into one node.
    /// The subtotal sums every unit's cost; confidence takes the
    /// minimum across units (the weakest link determines how much to
    /// trust the whole instance's total).
    pub fn from_units(instance_address: impl Into<String>, resource_type: impl Into<String>, units: Vec<CostUnit>) -> Self {
        let instance_address = instance_address.into();
        let resource_type = resource_type.into();

        let currency = units.first().map(|u| u.monthly_cost.currency()).unwrap_or(Currency::Usd);
        let mut subtotal = Money::zero(currency);
        let mut confidence = Confidence::CERTAIN;
        let mut assumption_count = 0;

        for unit in &units {
            subtotal = subtotal
                .checked_add(&unit.monthly_cost)
                .unwrap_or_else(|_| subtotal.scale(Decimal::ONE));
            confidence = confidence.min(unit.confidence);
            assumption_count += unit.assumption_count();
        }

        Self {
            instance_address,
            resource_type,
            units,
            subtotal,
            confidence,
            assumption_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{Derivation, UsageDerivation, UsageSource};
    use rust_decimal_macros::dec;

    fn unit(cost: Decimal, confidence: f64) -> CostUnit {
        CostUnit::new(
            "aws_instance.web",
            "compute",
            Money::new(cost, Currency::Usd),
            Confidence::new(confidence),
            Derivation::Usage(UsageDerivation {
                quantity: dec!(1),
                unit: "hour".into(),
                source: UsageSource::Explicit,
            }),
        )
    }

    #[test]
    fn subtotal_sums_units_and_confidence_takes_minimum() {
        let units = vec![unit(dec!(10), 0.9), unit(dec!(5), 0.4)];
        let node = CostNode::from_units("aws_instance.web", "aws_instance", units);
        assert_eq!(node.subtotal.amount(), dec!(15));
        assert_eq!(node.confidence.value(), 0.4);
    }

    #[test]
    fn empty_units_yields_zero_subtotal_and_certain_confidence() {
        let node = CostNode::from_units("aws_instance.web", "aws_instance", vec![]);
        assert_eq!(node.subtotal.amount(), Decimal::ZERO);
        assert_eq!(node.confidence.value(), 1.0);
    }
}
