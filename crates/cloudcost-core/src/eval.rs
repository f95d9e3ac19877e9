//! The evaluation context threaded through expansion and costing: the
//! scopes a [`Reference`](crate::reference::Reference) resolves
//! against.

use crate::reference::{PathStep, Reference, ReferenceHead};
use crate::value::{Evaluated, UnknownReason, Value};
use std::collections::BTreeMap;

/// A single child-module's bindings, nested the way `module.app.x`
/// resolves into that module's own `var`/`local`/resource scopes.
#[derive(Debug, Clone, Default)]
pub struct ModuleContext {
    pub variables: BTreeMap<String, Evaluated>,
    pub locals: BTreeMap<String, Evaluated>,
    pub resource_instances: BTreeMap<String, BTreeMap<String, Evaluated>>,
    pub data_sources: BTreeMap<String, BTreeMap<String, Evaluated>>,
    pub outputs: BTreeMap<String, Evaluated>,
    pub children: BTreeMap<String, ModuleContext>,
}

/// Everything a reference can resolve against for one instance's
/// evaluation: its own module's variables/locals/resources/data
/// sources, the child-module tree, and the per-instance `count`/
/// `for_each`/`self` bindings.
///
/// Cloning an `EvalContext` deep-copies scalar bindings and
/// shallow-copies resource-instance pointers, matching how each
/// expanded instance gets its own `count.index`/`each.key` but shares
/// the same already-evaluated sibling attributes.
#[derive(Debug, Clone, Default)]
pub struct EvalContext {
    pub workspace_name: String,
    /// `path.module`/`path.root`/`path.cwd` and `terraform.workspace`
    /// bindings, keyed by the path segment (`module`, `root`, `cwd`)
    /// or `workspace`.
    pub path_values: BTreeMap<String, String>,
    pub root: ModuleContext,
    pub count_index: Option<Evaluated>,
    pub each_key: Option<Evaluated>,
    pub each_value: Option<Evaluated>,
    pub self_attributes: BTreeMap<String, Evaluated>,
}

impl EvalContext {
    pub fn new(workspace_name: impl Into<String>) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            ..Default::default()
        }
    }

    /// Derives a per-instance context carrying this instance's
    /// `count.index` binding, inheriting everything else.
    pub fn with_count_index(&self, index: u64) -> Self {
        let mut ctx = self.clone();
        ctx.count_index = Some(Evaluated::known(crate::value::Value::Number(
            rust_decimal::Decimal::from(index),
        )));
        ctx.each_key = None;
        ctx.each_value = None;
        ctx
    }

    /// Derives a per-instance context carrying this instance's
    /// `each.key`/`each.value` bindings.
    pub fn with_each(&self, key: crate::value::Value, value: Evaluated) -> Self {
        let mut ctx = self.clone();
        ctx.each_key = Some(Evaluated::known(key));
        ctx.each_value = Some(value);
        ctx.count_index = None;
        ctx
    }

    pub fn with_self_attributes(&self, attrs: BTreeMap<String, Evaluated>) -> Self {
        let mut ctx = self.clone();
        ctx.self_attributes = attrs;
        ctx
    }

    pub fn lookup_var(&self, name: &str) -> Evaluated {
        self.root
            .variables
            .get(name)
            .cloned()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnboundVariable))
    }

    pub fn lookup_local(&self, name: &str) -> Evaluated {
        self.root
            .locals
            .get(name)
            .cloned()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnboundVariable))
    }

    pub fn lookup_resource_attr(&self, type_name: &str, instance_name: &str, attr: &str) -> Evaluated {
        let key = format!("{type_name}.{instance_name}");
        match self.root.resource_instances.get(&key) {
            Some(attrs) => attrs
                .get(attr)
                .cloned()
                .unwrap_or_else(|| Evaluated::unknown(UnknownReason::ComputedAttribute)),
            None => Evaluated::unknown(UnknownReason::ResourceNotCreated),
        }
    }

    pub fn lookup_data_source_attr(&self, type_name: &str, instance_name: &str, attr: &str) -> Evaluated {
        let key = format!("{type_name}.{instance_name}");
        self.root
            .data_sources
            .get(&key)
            .and_then(|attrs| attrs.get(attr))
            .cloned()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnresolvedDataSource))
    }

    pub fn lookup_module_output(&self, module_name: &str, output: &str) -> Evaluated {
        self.root
            .children
            .get(module_name)
            .and_then(|m| m.outputs.get(output))
            .cloned()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::ComputedAttribute))
    }

    pub fn lookup_self_attr(&self, attr: &str) -> Evaluated {
        self.self_attributes
            .get(attr)
            .cloned()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::ComputedAttribute))
    }

    pub fn count_index(&self) -> Evaluated {
        self.count_index
            .clone()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnknownCardinality))
    }

    pub fn each_key(&self) -> Evaluated {
        self.each_key
            .clone()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnknownCardinality))
    }

    pub fn each_value(&self) -> Evaluated {
        self.each_value
            .clone()
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnknownCardinality))
    }

    pub fn lookup_path(&self, segment: &str) -> Evaluated {
        self.path_values
            .get(segment)
            .map(|s| Evaluated::known(Value::String(s.clone())))
            .unwrap_or_else(|| Evaluated::unknown(UnknownReason::UnboundVariable))
    }

    pub fn lookup_terraform(&self, segment: &str) -> Evaluated {
        self.lookup_path(segment)
    }

    /// Resolves a parsed [`Reference`] to its strict value against this
    /// context's scopes: the head binding first, then any remaining
    /// `.attr`/`[index]` path steps walked generically over the
    /// result.
    pub fn resolve(&self, reference: &Reference) -> Evaluated {
        let head_value = match reference.head() {
            ReferenceHead::Var(name) => self.lookup_var(name),
            ReferenceHead::Local(name) => self.lookup_local(name),
            ReferenceHead::SelfRef => return self.resolve_self_path(reference.path()),
            ReferenceHead::CountIndex => self.count_index(),
            ReferenceHead::EachKey => self.each_key(),
            ReferenceHead::EachValue => self.each_value(),
            ReferenceHead::Path(segment) => self.lookup_path(segment),
            ReferenceHead::Terraform(segment) => self.lookup_terraform(segment),
            ReferenceHead::Data { type_name, name } => {
                return self.resolve_data_or_resource_path(type_name, name, reference.path(), true)
            }
            ReferenceHead::Resource { type_name, name } => {
                return self.resolve_data_or_resource_path(type_name, name, reference.path(), false)
            }
            ReferenceHead::Module(module_name) => {
                return self.resolve_module_path(module_name, reference.path())
            }
        };
        self.resolve_path(head_value, reference.path())
    }

    fn resolve_self_path(&self, path: &[PathStep]) -> Evaluated {
        let Some((first, rest)) = path.split_first() else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        let PathStep::Attr(attr) = first else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        self.resolve_path(self.lookup_self_attr(attr), rest)
    }

    /// Resources and data sources index by attribute name as
    /// their first path step, so the first step is consumed through
    /// the dedicated per-attribute lookup and the rest walked
    /// generically.
    fn resolve_data_or_resource_path(
        &self,
        type_name: &str,
        name: &str,
        path: &[PathStep],
        is_data_source: bool,
    ) -> Evaluated {
        let Some((first, rest)) = path.split_first() else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        let PathStep::Attr(attr) = first else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        let head_value = if is_data_source {
            self.lookup_data_source_attr(type_name, name, attr)
        } else {
            self.lookup_resource_attr(type_name, name, attr)
        };
        self.resolve_path(head_value, rest)
    }

    fn resolve_module_path(&self, module_name: &str, path: &[PathStep]) -> Evaluated {
        let Some((first, rest)) = path.split_first() else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        let PathStep::Attr(output) = first else {
            return Evaluated::unknown(UnknownReason::UnsupportedExpression);
        };
        self.resolve_path(self.lookup_module_output(module_name, output), rest)
    }

    /// Walks remaining `.attr`/`[index]` steps over an already-resolved
    /// value using the attribute-traversal algebra.
    fn resolve_path(&self, mut value: Evaluated, path: &[PathStep]) -> Evaluated {
        for step in path {
            value = match step {
                PathStep::Attr(name) => value.attr(name),
                PathStep::Index(key) => value.index(&index_key_value(key)),
            };
        }
        value
    }
}

/// An index token is always tokenized as a raw string (see
/// `reference::tokenize`); numeric-looking keys index lists, anything
/// else indexes maps.
fn index_key_value(key: &str) -> Value {
    match key.parse::<rust_decimal::Decimal>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(key.to_string()),
    }
}
