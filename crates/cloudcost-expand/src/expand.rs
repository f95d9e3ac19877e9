//! Expansion of a single resource definition into zero or more
//! instance addresses, driven by its `count`, `for_each`, or absence
//! of either.

use crate::error::{Error, Result};
use cloudcost_core::{DefinitionAddress, EvalContext, Evaluated, EvaluationMode, ExpansionKey, InstanceAddress, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The cardinality-determining expression attached to a resource
/// definition, already evaluated against its enclosing context.
#[derive(Clone)]
pub enum Cardinality {
    /// No `count`/`for_each`: exactly one instance.
    Single,
    Count(Evaluated),
    ForEach(Evaluated),
}

/// One expanded instance: its address and the per-instance context
/// (`count.index`/`each.key`/`each.value` bound) to evaluate the rest
/// of the block against.
pub struct ExpandedInstance {
    pub address: InstanceAddress,
    pub context: EvalContext,
}

/// Expands a resource definition under the given mode.
///
/// - `Single` always yields exactly one instance with
///   [`ExpansionKey::None`].
/// - `Count(n)` with a known non-negative integer yields `n`
///   instances keyed `0..n`.
/// - `ForEach(map)` with a known map yields one instance per key,
///   sorted for determinism.
/// - An unknown cardinality is rejected in strict mode; permissive and
///   estimate modes both yield one symbolic instance with all
///   attributes unknown, rather than guessing a concrete count.
pub fn expand(
    definition: &DefinitionAddress,
    cardinality: Cardinality,
    base_context: &EvalContext,
    mode: EvaluationMode,
) -> Result<Vec<ExpandedInstance>> {
    match cardinality {
        Cardinality::Single => Ok(vec![ExpandedInstance {
            address: InstanceAddress::new(definition.clone(), ExpansionKey::None),
            context: base_context.clone(),
        }]),
        Cardinality::Count(evaluated) => expand_count(definition, &evaluated, base_context, mode),
        Cardinality::ForEach(evaluated) => expand_for_each(definition, &evaluated, base_context, mode),
    }
}

fn expand_count(
    definition: &DefinitionAddress,
    evaluated: &Evaluated,
    base_context: &EvalContext,
    mode: EvaluationMode,
) -> Result<Vec<ExpandedInstance>> {
    let Evaluated::Known(value) = evaluated else {
        return handle_unknown_cardinality(definition, evaluated, base_context, mode);
    };
    let n = value
        .as_number()
        .and_then(|d| d.to_string().parse::<u64>().ok())
        .ok_or_else(|| Error::InvalidCountValue(definition.canonical()))?;

    debug!(address = %definition, count = n, "expanding count block");

    Ok((0..n)
        .map(|i| ExpandedInstance {
            address: InstanceAddress::new(definition.clone(), ExpansionKey::Count(i)),
            context: base_context.with_count_index(i),
        })
        .collect())
}

fn expand_for_each(
    definition: &DefinitionAddress,
    evaluated: &Evaluated,
    base_context: &EvalContext,
    mode: EvaluationMode,
) -> Result<Vec<ExpandedInstance>> {
    let Evaluated::Known(value) = evaluated else {
        return handle_unknown_cardinality(definition, evaluated, base_context, mode);
    };

    let entries = for_each_entries(&definition.canonical(), value)?;

    debug!(address = %definition, keys = entries.len(), "expanding for_each block");

    Ok(entries
        .into_iter()
        .map(|(key, value)| ExpandedInstance {
            address: InstanceAddress::new(definition.clone(), ExpansionKey::ForEach(key.clone())),
            context: base_context.with_each(Value::String(key), Evaluated::known(value)),
        })
        .collect())
}

/// Converts a known `for_each` value into its iteration entries: a map
/// iterates its own key/value pairs, a list iterates keyed by each
/// element's string value (Terraform's `toset(list)` behavior).
fn for_each_entries(label: &str, value: &Value) -> Result<BTreeMap<String, Value>> {
    match value {
        Value::Map(map) => Ok(map.clone()),
        Value::List(items) => {
            let mut map = BTreeMap::new();
            for item in items {
                let key = item
                    .as_str()
                    .ok_or_else(|| Error::InvalidForEachValue(label.to_string()))?;
                map.insert(key.to_string(), item.clone());
            }
            Ok(map)
        }
        _ => Err(Error::InvalidForEachValue(label.to_string())),
    }
}

/// A `dynamic "label" { for_each = ...; content { ... } }` block
/// attached to a resource body, with its `for_each` already evaluated
/// against the enclosing instance's context.
pub struct DynamicBlock {
    pub label: String,
    pub for_each: Evaluated,
}

/// One iteration's worth of expanded dynamic-block content: either a
/// known iteration (key/value bound into a child context for
/// evaluating the block's `content { ... }` body) or the single
/// unknown-content marker standing in for an unresolvable `for_each`.
pub enum ExpandedDynamicContent {
    Iteration { key: String, context: EvalContext },
    UnknownContent { context: EvalContext },
}

/// Expands a dynamic block's `for_each` into one content entry per
/// iteration (sorted by key), or a single unknown-content marker when
/// `for_each` is unknown. The iterator's `key`/`value` are exposed in
/// the child context the same way `each.key`/`each.value` are for a
/// resource-level `for_each`.
pub fn expand_dynamic_block(block: &DynamicBlock, base_context: &EvalContext) -> Result<Vec<ExpandedDynamicContent>> {
    let Evaluated::Known(value) = &block.for_each else {
        warn!(label = %block.label, "unknown dynamic block for_each, emitting unknown-content marker");
        return Ok(vec![ExpandedDynamicContent::UnknownContent {
            context: base_context.clone(),
        }]);
    };

    let entries = for_each_entries(&block.label, value)?;
    debug!(label = %block.label, keys = entries.len(), "expanding dynamic block");

    Ok(entries
        .into_iter()
        .map(|(key, value)| ExpandedDynamicContent::Iteration {
            context: base_context.with_each(Value::String(key.clone()), Evaluated::known(value)),
            key,
        })
        .collect())
}

fn handle_unknown_cardinality(
    definition: &DefinitionAddress,
    evaluated: &Evaluated,
    base_context: &EvalContext,
    mode: EvaluationMode,
) -> Result<Vec<ExpandedInstance>> {
    let reason = evaluated
        .as_unknown()
        .map(|u| u.reason().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match mode {
        EvaluationMode::Strict => Err(Error::UnknownCardinalityBlocked {
            address: definition.canonical(),
            reason,
        }),
        EvaluationMode::Permissive | EvaluationMode::Estimate => {
            warn!(address = %definition, %reason, "unknown cardinality, emitting one symbolic instance");
            Ok(vec![ExpandedInstance {
                address: InstanceAddress::new(definition.clone(), ExpansionKey::Symbolic),
                context: base_context.clone(),
            }])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcost_core::{UnknownReason, Unknown};
    use rust_decimal::Decimal;

    fn def() -> DefinitionAddress {
        DefinitionAddress::new(vec![], "aws_instance", "web")
    }

    #[test]
    fn single_yields_one_instance_with_none_key() {
        let ctx = EvalContext::new("default");
        let instances = expand(&def(), Cardinality::Single, &ctx, EvaluationMode::Strict).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].address.key(), &cloudcost_core::ExpansionKey::None);
    }

    #[test]
    fn known_count_expands_deterministically() {
        let ctx = EvalContext::new("default");
        let count = Evaluated::known(Value::Number(Decimal::from(3)));
        let instances = expand(&def(), Cardinality::Count(count), &ctx, EvaluationMode::Strict).unwrap();
        assert_eq!(instances.len(), 3);
        for (i, inst) in instances.iter().enumerate() {
            assert_eq!(inst.address.key(), &cloudcost_core::ExpansionKey::Count(i as u64));
        }
    }

    #[test]
    fn known_for_each_map_expands_sorted() {
        let ctx = EvalContext::new("default");
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::String("vb".into()));
        map.insert("a".to_string(), Value::String("va".into()));
        let each = Evaluated::known(Value::Map(map));
        let instances = expand(&def(), Cardinality::ForEach(each), &ctx, EvaluationMode::Strict).unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(
            instances[0].address.key(),
            &cloudcost_core::ExpansionKey::ForEach("a".into())
        );
    }

    #[test]
    fn strict_mode_rejects_unknown_count() {
        let ctx = EvalContext::new("default");
        let unknown = Evaluated::Unknown(Unknown::new(UnknownReason::UnknownCardinality));
        let err = expand(&def(), Cardinality::Count(unknown), &ctx, EvaluationMode::Strict).unwrap_err();
        assert!(matches!(err, Error::UnknownCardinalityBlocked { .. }));
    }

    #[test]
    fn permissive_mode_emits_symbolic_instance() {
        let ctx = EvalContext::new("default");
        let unknown = Evaluated::Unknown(Unknown::new(UnknownReason::UnknownCardinality));
        let instances = expand(&def(), Cardinality::Count(unknown), &ctx, EvaluationMode::Permissive).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].address.key(), &cloudcost_core::ExpansionKey::Symbolic);
    }

    #[test]
    fn estimate_mode_emits_symbolic_instance_like_permissive() {
        let ctx = EvalContext::new("default");
        let unknown = Evaluated::Unknown(Unknown::new(UnknownReason::UnknownCardinality));
        let instances = expand(&def(), Cardinality::Count(unknown), &ctx, EvaluationMode::Estimate).unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].address.key(), &cloudcost_core::ExpansionKey::Symbolic);
    }

    #[test]
    fn dynamic_block_known_map_expands_sorted_iterations() {
        let ctx = EvalContext::new("default");
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::String("vb".into()));
        map.insert("a".to_string(), Value::String("va".into()));
        let block = DynamicBlock {
            label: "ingress".into(),
            for_each: Evaluated::known(Value::Map(map)),
        };
        let content = expand_dynamic_block(&block, &ctx).unwrap();
        assert_eq!(content.len(), 2);
        match &content[0] {
            ExpandedDynamicContent::Iteration { key, context } => {
                assert_eq!(key, "a");
                assert_eq!(context.each_value().as_value().unwrap().as_str().unwrap(), "va");
            }
            _ => panic!("expected a known iteration"),
        }
    }

    #[test]
    fn dynamic_block_known_list_keys_by_element() {
        let ctx = EvalContext::new("default");
        let block = DynamicBlock {
            label: "rules".into(),
            for_each: Evaluated::known(Value::List(vec![Value::String("80".into()), Value::String("443".into())])),
        };
        let content = expand_dynamic_block(&block, &ctx).unwrap();
        assert_eq!(content.len(), 2);
    }

    #[test]
    fn dynamic_block_unknown_for_each_yields_single_unknown_content_marker() {
        let ctx = EvalContext::new("default");
        let block = DynamicBlock {
            label: "ingress".into(),
            for_each: Evaluated::Unknown(Unknown::new(UnknownReason::UnknownCardinality)),
        };
        let content = expand_dynamic_block(&block, &ctx).unwrap();
        assert_eq!(content.len(), 1);
        assert!(matches!(content[0], ExpandedDynamicContent::UnknownContent { .. }));
    }
}
