//! Deep-context policies: evaluated against one full [`CostAggregate`]
//! with no notion of a prior baseline.

use crate::result::PolicyResult;
use cloudcost_costing::CostAggregate;
use std::collections::BTreeMap;

/// Any policy that can judge a complete cost aggregate on its own.
pub trait Policy: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, aggregate: &CostAggregate) -> PolicyResult;
}

/// Rejects (or warns about) a project total over a monthly ceiling.
pub struct BudgetPolicy {
    pub max_monthly: cloudcost_core::Money,
}

impl Policy for BudgetPolicy {
    fn name(&self) -> &str {
        "budget"
    }

    fn evaluate(&self, aggregate: &CostAggregate) -> PolicyResult {
        match aggregate.project_total.checked_cmp(&self.max_monthly) {
            Ok(std::cmp::Ordering::Greater) => {
                let over_by = aggregate
                    .project_total
                    .checked_sub(&self.max_monthly)
                    .unwrap_or(self.max_monthly);
                PolicyResult::fail(
                    self.name(),
                    format!(
                        "monthly total {} exceeds budget {}",
                        aggregate.project_total, self.max_monthly
                    ),
                )
                .with_cost_impact(over_by)
                .with_recommendation(format!(
                    "reduce instance count or move to a cheaper tier to save at least {over_by}"
                ))
            }
            _ => PolicyResult::pass(self.name()),
        }
    }
}

/// Rejects an estimate whose overall confidence falls below a floor.
pub struct ConfidencePolicy {
    pub min_confidence: f64,
}

impl Policy for ConfidencePolicy {
    fn name(&self) -> &str {
        "confidence"
    }

    fn evaluate(&self, aggregate: &CostAggregate) -> PolicyResult {
        let confidence = aggregate.confidence.value();
        if confidence < self.min_confidence {
            PolicyResult::fail(
                self.name(),
                format!(
                    "overall confidence {confidence:.2} is below the required {:.2}",
                    self.min_confidence
                ),
            )
            .with_recommendation("resolve unbound variables and unresolved data sources to raise confidence".to_string())
        } else {
            PolicyResult::pass(self.name())
        }
    }
}

/// Caps the instance count for one resource type.
pub struct ResourceTypeLimitPolicy {
    pub resource_type: String,
    pub max_count: usize,
}

impl Policy for ResourceTypeLimitPolicy {
    fn name(&self) -> &str {
        "resource_type_limit"
    }

    fn evaluate(&self, aggregate: &CostAggregate) -> PolicyResult {
        let count = aggregate
            .nodes
            .iter()
            .filter(|n| n.resource_type == self.resource_type)
            .count();
        if count > self.max_count {
            PolicyResult::fail(
                self.name(),
                format!(
                    "{count} instances of '{}' exceed the limit of {}",
                    self.resource_type, self.max_count
                ),
            )
            .with_recommendation(format!(
                "reduce `count`/`for_each` on {} resources to at most {}",
                self.resource_type, self.max_count
            ))
        } else {
            PolicyResult::pass(self.name())
        }
    }
}

/// Requires every instance to carry a set of tag keys. Since
/// [`CostAggregate`] doesn't itself carry tag data, the tag map is
/// supplied alongside it, keyed by canonical instance address.
pub struct TagRequirementPolicy {
    pub required_keys: Vec<String>,
    pub tags_by_instance: BTreeMap<String, BTreeMap<String, String>>,
}

impl Policy for TagRequirementPolicy {
    fn name(&self) -> &str {
        "tag_requirement"
    }

    fn evaluate(&self, aggregate: &CostAggregate) -> PolicyResult {
        let mut missing = Vec::new();
        for node in &aggregate.nodes {
            let tags = self.tags_by_instance.get(&node.instance_address);
            for key in &self.required_keys {
                let present = tags.map(|t| t.contains_key(key)).unwrap_or(false);
                if !present {
                    missing.push(format!("{} missing tag '{key}'", node.instance_address));
                }
            }
        }
        if missing.is_empty() {
            PolicyResult::pass(self.name())
        } else {
            let mut result = PolicyResult::fail(self.name(), missing[0].clone());
            result.violations = missing;
            result.recommendation = Some(format!("add the required tags: {}", self.required_keys.join(", ")));
            result
        }
    }
}
