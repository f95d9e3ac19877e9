//! The cloud-mapper registration contract: one implementation per
//! resource type translates a bound, priced instance into its cost
//! units. Mirrors the `PricingStrategy` trait + registry pattern in
//! `blueprint-pricing-engine::models`, generalized from "pick a
//! pricing model" to "build cost units for a resource type".

use crate::error::{Error, Result};
use crate::unit::CostUnit;
use cloudcost_core::{EvalContext, InstanceAddress};
use cloudcost_pricing::PricingSnapshot;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Implemented once per resource type (`aws_instance`, `aws_db_instance`,
/// ...) to turn a bound instance plus a pricing snapshot into priced
/// cost units.
pub trait CloudCostMapper: Send + Sync {
    fn resource_type(&self) -> &str;

    /// Builds the cost units for one instance. `context` carries the
    /// instance's evaluated attributes (`count.index`, `self.*`, any
    /// referenced values); `snapshot` is the frozen pricing data to
    /// price against.
    fn build_cost_units(
        &self,
        address: &InstanceAddress,
        context: &EvalContext,
        snapshot: &PricingSnapshot,
    ) -> Result<Vec<CostUnit>>;
}

/// A registry of mappers keyed by resource type, guarded by a single
/// `RwLock` (many concurrent readers during the costing pass, rare
/// writers during setup).
#[derive(Default)]
pub struct MapperRegistry {
    mappers: RwLock<HashMap<String, Arc<dyn CloudCostMapper>>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, mapper: Arc<dyn CloudCostMapper>) {
        self.mappers.write().insert(mapper.resource_type().to_string(), mapper);
    }

    pub fn get(&self, resource_type: &str) -> Result<Arc<dyn CloudCostMapper>> {
        self.mappers
            .read()
            .get(resource_type)
            .cloned()
            .ok_or_else(|| Error::NoMapper(resource_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.mappers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::Confidence;
    use crate::lineage::{Derivation, UsageDerivation, UsageSource};
    use cloudcost_core::{Currency, DefinitionAddress, ExpansionKey, Money};
    use rust_decimal_macros::dec;

    struct FixedPriceMapper;

    impl CloudCostMapper for FixedPriceMapper {
        fn resource_type(&self) -> &str {
            "aws_instance"
        }

        fn build_cost_units(
            &self,
            address: &InstanceAddress,
            _context: &EvalContext,
            _snapshot: &PricingSnapshot,
        ) -> Result<Vec<CostUnit>> {
            Ok(vec![CostUnit::new(
                address.canonical(),
                "compute",
                Money::new(dec!(70.08), Currency::Usd),
                Confidence::new(1.0),
                Derivation::Usage(UsageDerivation {
                    quantity: dec!(730),
                    unit: "hour".into(),
                    source: UsageSource::Assumed("default hours/month".into()),
                }),
            )])
        }
    }

    #[test]
    fn registers_and_resolves_by_resource_type() {
        let registry = MapperRegistry::new();
        registry.register(Arc::new(FixedPriceMapper));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("aws_instance").is_ok());
        assert!(registry.get("aws_db_instance").is_err());
    }

    #[test]
    fn mapper_produces_expected_cost_units() {
        let registry = MapperRegistry::new();
        registry.register(Arc::new(FixedPriceMapper));
        let mapper = registry.get("aws_instance").unwrap();
        let address = InstanceAddress::new(DefinitionAddress::new(vec![], "aws_instance", "web"), ExpansionKey::None);
        let snapshot = PricingSnapshot::new("aws", "us-east-1", chrono::Utc::now(), Default::default());
        let units = mapper
            .build_cost_units(&address, &EvalContext::new("default"), &snapshot)
            .unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].monthly_cost.amount(), dec!(70.08));
    }
}
