//! The strict value/unknown algebra.
//!
//! Every expression in the pipeline evaluates to either a concrete
//! [`Value`] or an [`Unknown`] carrying a reason and a propagation
//! depth. Arithmetic and comparison on an unknown input always yields
//! an unknown output; nothing silently defaults to zero or to a
//! placeholder concrete value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a value could not be resolved to something concrete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownReason {
    /// A computed-at-apply-time attribute (e.g. a generated ID).
    ComputedAttribute,
    /// A data source lookup that was not provided ahead of time.
    UnresolvedDataSource,
    /// `count`/`for_each` itself depends on an unknown.
    UnknownCardinality,
    /// A variable with no default and no supplied value.
    UnboundVariable,
    /// The value depends, transitively, on another unknown.
    Propagated,
    /// An operation could not be evaluated on otherwise-known operands:
    /// division by zero, indexing out of range or with the wrong key
    /// type, a non-bool condition, or a function outside its known
    /// domain.
    UnsupportedExpression,
    /// A reference points at a resource with no expanded instance yet
    /// (it has not been created, as opposed to an attribute that is
    /// merely computed at apply time on an instance that exists).
    ResourceNotCreated,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnknownReason::ComputedAttribute => "computed_attribute",
            UnknownReason::UnresolvedDataSource => "unresolved_data_source",
            UnknownReason::UnknownCardinality => "unknown_cardinality",
            UnknownReason::UnboundVariable => "unbound_variable",
            UnknownReason::Propagated => "propagated",
            UnknownReason::UnsupportedExpression => "unsupported_expression",
            UnknownReason::ResourceNotCreated => "resource_not_created",
        };
        f.write_str(s)
    }
}

/// An unresolved value: a reason, an optional type hint for the
/// downstream costing pass, and how many hops of propagation produced
/// it (0 = the original unknown, >0 = inherited from an operand).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unknown {
    reason: UnknownReason,
    expected_type: Option<String>,
    propagation_depth: u32,
}

impl Unknown {
    pub fn new(reason: UnknownReason) -> Self {
        Self {
            reason,
            expected_type: None,
            propagation_depth: 0,
        }
    }

    pub fn with_expected_type(mut self, ty: impl Into<String>) -> Self {
        self.expected_type = Some(ty.into());
        self
    }

    pub fn reason(&self) -> &UnknownReason {
        &self.reason
    }

    pub fn expected_type(&self) -> Option<&str> {
        self.expected_type.as_deref()
    }

    pub fn propagation_depth(&self) -> u32 {
        self.propagation_depth
    }

    /// Derives a child unknown one hop further from the original
    /// cause, keeping the original reason and type hint.
    pub fn propagate(&self) -> Self {
        Self {
            reason: UnknownReason::Propagated,
            expected_type: self.expected_type.clone(),
            propagation_depth: self.propagation_depth + 1,
        }
    }
}

/// A concrete, resolved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(rust_decimal::Decimal),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_number(&self) -> Option<rust_decimal::Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} = {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Either a resolved [`Value`] or an [`Unknown`]. This is the type
/// every evaluation step produces — there is no third "error" state
/// for data-dependent issues; those are [`Unknown`]s with a reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evaluated {
    Known(Value),
    Unknown(Unknown),
}

impl Evaluated {
    pub fn known(value: Value) -> Self {
        Evaluated::Known(value)
    }

    pub fn unknown(reason: UnknownReason) -> Self {
        Evaluated::Unknown(Unknown::new(reason))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Evaluated::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Evaluated::Unknown(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Evaluated::Known(v) => Some(v),
            Evaluated::Unknown(_) => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Unknown> {
        match self {
            Evaluated::Unknown(u) => Some(u),
            Evaluated::Known(_) => None,
        }
    }

    /// Combines two operands the way every binary operator must:
    /// if either side is unknown, the result is unknown with
    /// propagation depth one greater than the deepest operand.
    pub fn combine(a: &Evaluated, b: &Evaluated, f: impl FnOnce(&Value, &Value) -> Value) -> Evaluated {
        match (a, b) {
            (Evaluated::Known(va), Evaluated::Known(vb)) => Evaluated::Known(f(va, vb)),
            (Evaluated::Unknown(ua), Evaluated::Unknown(ub)) => {
                Evaluated::Unknown(deepest(ua, ub).propagate())
            }
            (Evaluated::Unknown(u), Evaluated::Known(_)) | (Evaluated::Known(_), Evaluated::Unknown(u)) => {
                Evaluated::Unknown(u.propagate())
            }
        }
    }

    fn numeric(a: &Evaluated, b: &Evaluated, f: impl Fn(rust_decimal::Decimal, rust_decimal::Decimal) -> rust_decimal::Decimal) -> Evaluated {
        if a.is_unknown() || b.is_unknown() {
            return Evaluated::combine(a, b, |_, _| unreachable!());
        }
        match (a.as_value().and_then(Value::as_number), b.as_value().and_then(Value::as_number)) {
            (Some(x), Some(y)) => Evaluated::Known(Value::Number(f(x, y))),
            _ => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }

    /// `a + b`. Unknown operands propagate; non-numeric known operands
    /// are an unsupported expression.
    pub fn checked_add(a: &Evaluated, b: &Evaluated) -> Evaluated {
        Evaluated::numeric(a, b, |x, y| x + y)
    }

    /// `a - b`.
    pub fn checked_sub(a: &Evaluated, b: &Evaluated) -> Evaluated {
        Evaluated::numeric(a, b, |x, y| x - y)
    }

    /// `a * b`.
    pub fn checked_mul(a: &Evaluated, b: &Evaluated) -> Evaluated {
        Evaluated::numeric(a, b, |x, y| x * y)
    }

    /// `a / b`. Division by zero on two known operands is an unknown
    /// with reason [`UnknownReason::UnsupportedExpression`], not a
    /// hard error — the pipeline never raises on data-dependent
    /// issues.
    pub fn checked_div(a: &Evaluated, b: &Evaluated) -> Evaluated {
        if a.is_unknown() || b.is_unknown() {
            return Evaluated::combine(a, b, |_, _| unreachable!());
        }
        match (a.as_value().and_then(Value::as_number), b.as_value().and_then(Value::as_number)) {
            (Some(_), Some(y)) if y.is_zero() => Evaluated::unknown(UnknownReason::UnsupportedExpression),
            (Some(x), Some(y)) => Evaluated::Known(Value::Number(x / y)),
            _ => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }

    /// Strict-value comparison. Comparing two unknowns, or a known to
    /// an unknown, always yields an unknown; comparing two knowns of
    /// incomparable types is an unsupported expression.
    pub fn compare(a: &Evaluated, b: &Evaluated, op: CompareOp) -> Evaluated {
        if a.is_unknown() || b.is_unknown() {
            return Evaluated::combine(a, b, |_, _| unreachable!());
        }
        let (va, vb) = (a.as_value().unwrap(), b.as_value().unwrap());

        if matches!(op, CompareOp::Eq | CompareOp::Ne) {
            if let (Value::Bool(x), Value::Bool(y)) = (va, vb) {
                let eq = x == y;
                return Evaluated::Known(Value::Bool(if op == CompareOp::Eq { eq } else { !eq }));
            }
        }

        let ordering = match (va, vb) {
            (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
            (Value::String(x), Value::String(y)) => x.partial_cmp(y),
            _ => None,
        };

        match ordering {
            Some(ord) => Evaluated::Known(Value::Bool(op.matches(ord))),
            None => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }

    /// `cond ? if_true : if_false`. An unknown condition propagates;
    /// a known non-bool condition is an unsupported expression.
    pub fn conditional(cond: &Evaluated, if_true: &Evaluated, if_false: &Evaluated) -> Evaluated {
        match cond {
            Evaluated::Unknown(u) => Evaluated::Unknown(u.propagate()),
            Evaluated::Known(Value::Bool(true)) => if_true.clone(),
            Evaluated::Known(Value::Bool(false)) => if_false.clone(),
            Evaluated::Known(_) => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }

    /// Indexes a list (integer key) or map (string key). Traversing an
    /// unknown produces an unknown carrying the same expected-type
    /// hint, one propagation hop deeper.
    pub fn index(&self, key: &Value) -> Evaluated {
        match self {
            Evaluated::Unknown(u) => Evaluated::Unknown(u.propagate()),
            Evaluated::Known(Value::List(items)) => match key
                .as_number()
                .and_then(|n| n.to_string().parse::<usize>().ok())
                .and_then(|i| items.get(i))
            {
                Some(v) => Evaluated::Known(v.clone()),
                None => Evaluated::unknown(UnknownReason::UnsupportedExpression),
            },
            Evaluated::Known(Value::Map(map)) => match key.as_str().and_then(|k| map.get(k)) {
                Some(v) => Evaluated::Known(v.clone()),
                None => Evaluated::unknown(UnknownReason::UnsupportedExpression),
            },
            Evaluated::Known(_) => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }

    /// Attribute traversal: sugar for [`Self::index`] with a string
    /// key, the shape a `.attr` path step produces.
    pub fn attr(&self, name: &str) -> Evaluated {
        self.index(&Value::String(name.to_string()))
    }

    /// `length(self)` for lists, maps, and strings.
    pub fn length(&self) -> Evaluated {
        match self {
            Evaluated::Unknown(u) => Evaluated::Unknown(u.propagate()),
            Evaluated::Known(Value::List(items)) => {
                Evaluated::Known(Value::Number(rust_decimal::Decimal::from(items.len())))
            }
            Evaluated::Known(Value::Map(map)) => {
                Evaluated::Known(Value::Number(rust_decimal::Decimal::from(map.len())))
            }
            Evaluated::Known(Value::String(s)) => {
                Evaluated::Known(Value::Number(rust_decimal::Decimal::from(s.chars().count())))
            }
            Evaluated::Known(_) => Evaluated::unknown(UnknownReason::UnsupportedExpression),
        }
    }
}

/// A strict-value comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn matches(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            CompareOp::Eq => ord == Equal,
            CompareOp::Ne => ord != Equal,
            CompareOp::Lt => ord == Less,
            CompareOp::Le => ord != Greater,
            CompareOp::Gt => ord == Greater,
            CompareOp::Ge => ord != Less,
        }
    }
}

fn deepest<'a>(a: &'a Unknown, b: &'a Unknown) -> &'a Unknown {
    if a.propagation_depth() >= b.propagation_depth() {
        a
    } else {
        b
    }
}

/// The set of unknowns accumulated over an estimation run, keyed by
/// the canonical address of the attribute that produced them, for
/// reporting in the coverage/confidence summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnknownSet {
    entries: BTreeMap<String, Unknown>,
}

impl UnknownSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, address: impl Into<String>, unknown: Unknown) {
        self.entries.insert(address.into(), unknown);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Unknown)> {
        self.entries.iter()
    }

    pub fn max_propagation_depth(&self) -> u32 {
        self.entries
            .values()
            .map(Unknown::propagation_depth)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn combine_known_known_applies_function() {
        let a = Evaluated::known(Value::Number(Decimal::from(2)));
        let b = Evaluated::known(Value::Number(Decimal::from(3)));
        let sum = Evaluated::combine(&a, &b, |x, y| {
            Value::Number(x.as_number().unwrap() + y.as_number().unwrap())
        });
        assert_eq!(sum.as_value().unwrap().as_number().unwrap(), Decimal::from(5));
    }

    #[test]
    fn combine_known_unknown_is_unknown_with_propagation() {
        let known = Evaluated::known(Value::Number(Decimal::from(2)));
        let unknown = Evaluated::unknown(UnknownReason::UnboundVariable);
        let result = Evaluated::combine(&known, &unknown, |_, _| unreachable!());
        let u = result.as_unknown().unwrap();
        assert_eq!(u.propagation_depth(), 1);
        assert_eq!(*u.reason(), UnknownReason::Propagated);
    }

    #[test]
    fn combine_unknown_unknown_takes_deepest_and_increments() {
        let shallow = Evaluated::Unknown(Unknown::new(UnknownReason::UnboundVariable));
        let deep = Evaluated::Unknown(Unknown::new(UnknownReason::Propagated).propagate().propagate());
        let result = Evaluated::combine(&shallow, &deep, |_, _| unreachable!());
        assert_eq!(result.as_unknown().unwrap().propagation_depth(), 3);
    }

    #[test]
    fn unknown_set_tracks_max_depth() {
        let mut set = UnknownSet::new();
        set.record("a", Unknown::new(UnknownReason::UnboundVariable));
        set.record("b", Unknown::new(UnknownReason::Propagated).propagate());
        assert_eq!(set.max_propagation_depth(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn checked_add_sums_known_numbers() {
        let a = Evaluated::known(Value::Number(Decimal::from(2)));
        let b = Evaluated::known(Value::Number(Decimal::from(3)));
        assert_eq!(Evaluated::checked_add(&a, &b).as_value().unwrap().as_number().unwrap(), Decimal::from(5));
    }

    #[test]
    fn checked_add_propagates_unknown_operand() {
        let a = Evaluated::known(Value::Number(Decimal::from(2)));
        let b = Evaluated::unknown(UnknownReason::UnboundVariable);
        assert!(Evaluated::checked_add(&a, &b).is_unknown());
    }

    #[test]
    fn checked_div_by_zero_is_unsupported_expression() {
        let a = Evaluated::known(Value::Number(Decimal::from(10)));
        let b = Evaluated::known(Value::Number(Decimal::ZERO));
        let result = Evaluated::checked_div(&a, &b);
        assert_eq!(*result.as_unknown().unwrap().reason(), UnknownReason::UnsupportedExpression);
    }

    #[test]
    fn checked_div_known_operands_divides() {
        let a = Evaluated::known(Value::Number(Decimal::from(10)));
        let b = Evaluated::known(Value::Number(Decimal::from(4)));
        assert_eq!(Evaluated::checked_div(&a, &b).as_value().unwrap().as_number().unwrap(), Decimal::new(25, 1));
    }

    #[test]
    fn compare_orders_known_numbers() {
        let a = Evaluated::known(Value::Number(Decimal::from(1)));
        let b = Evaluated::known(Value::Number(Decimal::from(2)));
        assert_eq!(Evaluated::compare(&a, &b, CompareOp::Lt).as_value().unwrap().as_bool(), Some(true));
        assert_eq!(Evaluated::compare(&a, &b, CompareOp::Eq).as_value().unwrap().as_bool(), Some(false));
    }

    #[test]
    fn compare_unknown_operand_is_unknown() {
        let a = Evaluated::known(Value::Number(Decimal::from(1)));
        let b = Evaluated::unknown(UnknownReason::ComputedAttribute);
        assert!(Evaluated::compare(&a, &b, CompareOp::Eq).is_unknown());
    }

    #[test]
    fn conditional_picks_known_bool_branch() {
        let cond = Evaluated::known(Value::Bool(true));
        let if_true = Evaluated::known(Value::String("yes".into()));
        let if_false = Evaluated::known(Value::String("no".into()));
        assert_eq!(
            Evaluated::conditional(&cond, &if_true, &if_false).as_value().unwrap().as_str(),
            Some("yes")
        );
    }

    #[test]
    fn conditional_unknown_condition_propagates() {
        let cond = Evaluated::unknown(UnknownReason::UnboundVariable);
        let if_true = Evaluated::known(Value::Bool(true));
        let if_false = Evaluated::known(Value::Bool(false));
        let result = Evaluated::conditional(&cond, &if_true, &if_false);
        assert_eq!(*result.as_unknown().unwrap().reason(), UnknownReason::Propagated);
    }

    #[test]
    fn index_known_list_by_number() {
        let list = Evaluated::known(Value::List(vec![Value::String("a".into()), Value::String("b".into())]));
        assert_eq!(list.index(&Value::Number(Decimal::from(1))).as_value().unwrap().as_str(), Some("b"));
    }

    #[test]
    fn attr_looks_up_map_entry() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::String("web".into()));
        let known = Evaluated::known(Value::Map(map));
        assert_eq!(known.attr("name").as_value().unwrap().as_str(), Some("web"));
    }

    #[test]
    fn index_unknown_propagates() {
        let unknown = Evaluated::unknown(UnknownReason::UnresolvedDataSource);
        assert!(unknown.index(&Value::Number(Decimal::from(0))).is_unknown());
    }

    #[test]
    fn length_of_list_and_string() {
        let list = Evaluated::known(Value::List(vec![Value::Null, Value::Null, Value::Null]));
        assert_eq!(list.length().as_value().unwrap().as_number().unwrap(), Decimal::from(3));
        let s = Evaluated::known(Value::String("hello".into()));
        assert_eq!(s.length().as_value().unwrap().as_number().unwrap(), Decimal::from(5));
    }

    proptest::proptest! {
        #[test]
        fn any_combine_with_an_unknown_operand_yields_unknown(depth_a in 0u32..5, depth_b in 0u32..5) {
            let mut ua = Unknown::new(UnknownReason::UnboundVariable);
            for _ in 0..depth_a {
                ua = ua.propagate();
            }
            let known = Evaluated::known(Value::Number(rust_decimal::Decimal::from(1)));
            let unknown = Evaluated::Unknown(ua);
            let result = Evaluated::combine(&known, &unknown, |_, _| unreachable!());
            proptest::prop_assert!(result.is_unknown());
            proptest::prop_assert!(result.as_unknown().unwrap().propagation_depth() >= 1);
            let _ = depth_b;
        }
    }
}
