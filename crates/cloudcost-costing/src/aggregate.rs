//! Service- and project-level rollups, and a flat summary view ready
//! for an external adapter to render (the core stops at this data
//! shape; rendering it is out of scope).

use crate::confidence::Confidence;
use crate::node::CostNode;
use cloudcost_core::{Currency, Money};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CostAggregate {
    pub nodes: Vec<CostNode>,
    pub service_totals: BTreeMap<String, Money>,
    pub project_total: Money,
    pub confidence: Confidence,
    pub assumption_count: usize,
}

impl CostAggregate {
    /// Folds every instance's [`CostNode`] into per-resource-type
    /// service totals and a project total. Confidence is the minimum
    /// across all nodes; assumption counts sum.
    pub fn from_nodes(nodes: Vec<CostNode>) -> Self {
        let mut service_totals: BTreeMap<String, Money> = BTreeMap::new();
        let mut project_total = Money::zero(Currency::Usd);
        let mut confidence = Confidence::CERTAIN;
        let mut assumption_count = 0;

        for node in &nodes {
            let entry = service_totals
                .entry(node.resource_type.clone())
                .or_insert_with(|| Money::zero(node.subtotal.currency()));
            *entry = entry
                .checked_add(&node.subtotal)
                .unwrap_or_else(|_| entry.scale(Decimal::ONE));
            project_total = project_total
                .checked_add(&node.subtotal)
                .unwrap_or_else(|_| project_total.scale(Decimal::ONE));
            confidence = confidence.min(node.confidence);
            assumption_count += node.assumption_count;
        }

        Self {
            nodes,
            service_totals,
            project_total,
            confidence,
            assumption_count,
        }
    }

    /// A flat, already-sorted breakdown table: one row per instance,
    /// ordered by canonical address, ready for an external CLI/HTTP
    /// layer to render without recomputing anything.
    pub fn summarize(&self) -> Vec<SummaryRow> {
        let mut rows: Vec<SummaryRow> = self
            .nodes
            .iter()
            .map(|node| SummaryRow {
                instance_address: node.instance_address.clone(),
                resource_type: node.resource_type.clone(),
                monthly_cost: node.subtotal,
                confidence: node.confidence,
                assumption_count: node.assumption_count,
            })
            .collect();
        rows.sort_by(|a, b| a.instance_address.cmp(&b.instance_address));
        rows
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub instance_address: String,
    pub resource_type: String,
    pub monthly_cost: Money,
    pub confidence: Confidence,
    pub assumption_count: usize,
}
