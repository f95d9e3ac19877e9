//! Bottom-up aggregation: prices every instance (in parallel, bounded
//! by rayon's global pool) into a [`CostNode`], then folds the nodes
//! into a [`CostAggregate`].

use crate::aggregate::CostAggregate;
use crate::error::Result;
use crate::mapper::MapperRegistry;
use crate::node::CostNode;
use cloudcost_core::{EvalContext, InstanceAddress};
use cloudcost_pricing::PricingSnapshot;
use rayon::prelude::*;

/// One instance ready to be priced: its address, its resource type,
/// the evaluation context to price against, and the snapshot its
/// provider resolved to.
pub struct CostingInput<'a> {
    pub address: InstanceAddress,
    pub resource_type: String,
    pub context: EvalContext,
    pub snapshot: &'a PricingSnapshot,
}

/// Prices every input instance and folds the results into one
/// aggregate. A mapper failure for one instance fails the whole pass
/// rather than silently dropping a node — a missing cost unit would
/// otherwise understate the project total without any visible trace.
pub fn cost_instances(inputs: Vec<CostingInput<'_>>, mappers: &MapperRegistry) -> Result<CostAggregate> {
    let nodes: Result<Vec<CostNode>> = inputs
        .into_par_iter()
        .map(|input| {
            let mapper = mappers.get(&input.resource_type)?;
            let units = mapper.build_cost_units(&input.address, &input.context, input.snapshot)?;
            Ok(CostNode::from_units(input.address.canonical(), input.resource_type, units))
        })
        .collect();

    Ok(CostAggregate::from_nodes(nodes?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::Confidence;
    use crate::lineage::{Derivation, UsageDerivation, UsageSource};
    use crate::mapper::CloudCostMapper;
    use cloudcost_core::{Currency, DefinitionAddress, ExpansionKey, Money};
    use cloudcost_pricing::PricingSnapshot;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct FlatRateMapper;

    impl CloudCostMapper for FlatRateMapper {
        fn resource_type(&self) -> &str {
            "aws_instance"
        }

        fn build_cost_units(
            &self,
            address: &InstanceAddress,
            _context: &EvalContext,
            _snapshot: &PricingSnapshot,
        ) -> Result<Vec<crate::unit::CostUnit>> {
            Ok(vec![crate::unit::CostUnit::new(
                address.canonical(),
                "compute",
                Money::new(dec!(10), Currency::Usd),
                Confidence::new(1.0),
                Derivation::Usage(UsageDerivation {
                    quantity: dec!(730),
                    unit: "hour".into(),
                    source: UsageSource::Explicit,
                }),
            )])
        }
    }

    #[test]
    fn costs_multiple_instances_and_sums_project_total() {
        let registry = MapperRegistry::new();
        registry.register(Arc::new(FlatRateMapper));
        let snapshot = PricingSnapshot::new("aws", "us-east-1", chrono::Utc::now(), Default::default());

        let inputs = (0..3)
            .map(|i| CostingInput {
                address: InstanceAddress::new(
                    DefinitionAddress::new(vec![], "aws_instance", "web"),
                    ExpansionKey::Count(i),
                ),
                resource_type: "aws_instance".to_string(),
                context: EvalContext::new("default"),
                snapshot: &snapshot,
            })
            .collect();

        let aggregate = cost_instances(inputs, &registry).unwrap();
        assert_eq!(aggregate.project_total.amount(), dec!(30));
        assert_eq!(aggregate.nodes.len(), 3);
    }

    #[test]
    fn missing_mapper_fails_the_whole_pass() {
        let registry = MapperRegistry::new();
        let snapshot = PricingSnapshot::new("aws", "us-east-1", chrono::Utc::now(), Default::default());
        let inputs = vec![CostingInput {
            address: InstanceAddress::new(DefinitionAddress::new(vec![], "aws_db_instance", "db"), ExpansionKey::None),
            resource_type: "aws_db_instance".to_string(),
            context: EvalContext::new("default"),
            snapshot: &snapshot,
        }];
        assert!(cost_instances(inputs, &registry).is_err());
    }
}
