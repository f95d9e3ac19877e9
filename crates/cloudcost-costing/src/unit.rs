//! The leaf of the cost model: one priced line item for one resource
//! instance.

use crate::confidence::Confidence;
use crate::lineage::Derivation;
use cloudcost_core::Money;
use serde::{Deserialize, Serialize};

/// One priced component of an instance's monthly cost (an instance
/// can have more than one, e.g. compute plus attached storage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostUnit {
    pub instance_address: String,
    pub component: String,
    pub monthly_cost: Money,
    /// Derived from `monthly_cost` (divided by 730), never priced
    /// independently.
    pub hourly_cost: Money,
    pub confidence: Confidence,
    pub derivation: Derivation,
}

impl CostUnit {
    pub fn new(
        instance_address: impl Into<String>,
        component: impl Into<String>,
        monthly_cost: Money,
        confidence: Confidence,
        derivation: Derivation,
    ) -> Self {
        Self {
            instance_address: instance_address.into(),
            component: component.into(),
            hourly_cost: monthly_cost.monthly_to_hourly(),
            monthly_cost,
            confidence,
            derivation,
        }
    }

    pub fn assumption_count(&self) -> usize {
        self.derivation.assumption_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{RateDerivation, UsageDerivation, UsageSource};
    use cloudcost_core::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn assumption_count_delegates_to_derivation() {
        let unit = CostUnit::new(
            "aws_instance.web",
            "compute",
            Money::new(dec!(70.08), Currency::Usd),
            Confidence::new(0.8),
            Derivation::Usage(UsageDerivation {
                quantity: dec!(730),
                unit: "hour".into(),
                source: UsageSource::Assumed("default hours/month".into()),
            }),
        );
        assert_eq!(unit.assumption_count(), 1);
        let _ = RateDerivation {
            snapshot_id: "x".into(),
            rate_key: "k".into(),
            unit_rate: dec!(0.096),
            unit: "hour".into(),
        };
    }

    #[test]
    fn hourly_cost_is_monthly_divided_by_730() {
        let unit = CostUnit::new(
            "aws_instance.web",
            "compute",
            Money::new(dec!(7.592), Currency::Usd),
            Confidence::CERTAIN,
            Derivation::Usage(UsageDerivation {
                quantity: dec!(730),
                unit: "hour".into(),
                source: UsageSource::Explicit,
            }),
        );
        assert_eq!(unit.hourly_cost.amount(), dec!(0.0104));
    }
}
