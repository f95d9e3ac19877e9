//! Diff-aware policies: evaluated against a baseline and a proposed
//! aggregate, for "what changed" checks a pure snapshot can't express.

use crate::result::PolicyResult;
use cloudcost_costing::CostAggregate;
use std::collections::BTreeSet;

pub trait DiffPolicy: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate_diff(&self, baseline: &CostAggregate, proposed: &CostAggregate) -> PolicyResult;
}

/// Rejects a proposed change that increases the project total by more
/// than a fixed amount.
pub struct DeltaBudgetPolicy {
    pub max_delta: cloudcost_core::Money,
}

impl DiffPolicy for DeltaBudgetPolicy {
    fn name(&self) -> &str {
        "delta_budget"
    }

    fn evaluate_diff(&self, baseline: &CostAggregate, proposed: &CostAggregate) -> PolicyResult {
        let delta = match proposed.project_total.checked_sub(&baseline.project_total) {
            Ok(d) => d,
            Err(_) => return PolicyResult::pass(self.name()),
        };
        match delta.checked_cmp(&self.max_delta) {
            Ok(std::cmp::Ordering::Greater) => PolicyResult::fail(
                self.name(),
                format!("monthly cost would increase by {delta}, exceeding the allowed {}", self.max_delta),
            )
            .with_cost_impact(delta)
            .with_recommendation("stage this change behind a smaller rollout or raise the delta budget".to_string()),
            _ => PolicyResult::pass(self.name()),
        }
    }
}

/// Warns when the proposed change introduces new unresolved
/// assumptions (tracked via each node's `assumption_count`) that
/// weren't present in the baseline.
pub struct NewUnknownsPolicy;

impl DiffPolicy for NewUnknownsPolicy {
    fn name(&self) -> &str {
        "new_unknowns"
    }

    fn evaluate_diff(&self, baseline: &CostAggregate, proposed: &CostAggregate) -> PolicyResult {
        let baseline_assumptions: usize = baseline.assumption_count;
        let proposed_assumptions: usize = proposed.assumption_count;
        if proposed_assumptions > baseline_assumptions {
            PolicyResult::pass(self.name()).with_warning(format!(
                "{} new unresolved assumption(s) introduced by this change",
                proposed_assumptions - baseline_assumptions
            ))
        } else {
            PolicyResult::pass(self.name())
        }
    }
}

/// Wraps a deep-context [`super::policies::Policy`] so it only sees
/// instances present in `proposed` but absent from `baseline`,
/// letting existing infrastructure bypass a check that should only
/// gate additions.
pub struct NewResourcesOnlyPolicy<P> {
    pub inner: P,
}

impl<P: crate::policies::Policy> DiffPolicy for NewResourcesOnlyPolicy<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn evaluate_diff(&self, baseline: &CostAggregate, proposed: &CostAggregate) -> PolicyResult {
        let existing: BTreeSet<&str> = baseline.nodes.iter().map(|n| n.instance_address.as_str()).collect();
        let new_nodes: Vec<_> = proposed
            .nodes
            .iter()
            .filter(|n| !existing.contains(n.instance_address.as_str()))
            .cloned()
            .collect();
        let new_only = CostAggregate::from_nodes(new_nodes);
        self.inner.evaluate(&new_only)
    }
}
