//! Infix comparison and containment operators
//!
//! The registry is pre-populated with the seven built-in operators and may
//! be extended by the embedder. Operators are pure functions over two
//! values; by convention they return booleans.

use crate::value::Value;
use indexmap::IndexMap;
use std::cmp::Ordering;

/// An infix operator evaluator over `(lhs, rhs)`
pub type OperatorFunction = fn(&Value, &Value) -> Value;

/// A table of operators keyed by identifier
#[derive(Clone, Debug)]
pub struct OperatorRegistry {
    operators: IndexMap<String, OperatorFunction>,
}

impl OperatorRegistry {
    pub fn register(&mut self, name: impl Into<String>, operator: OperatorFunction) {
        self.operators.insert(name.into(), operator);
    }

    pub fn get(&self, name: &str) -> Option<OperatorFunction> {
        self.operators.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }
}

/// The seven built-in comparison/containment operators
impl Default for OperatorRegistry {
    fn default() -> Self {
        let mut registry = Self {
            operators: IndexMap::new(),
        };
        registry.register("==", equals);
        registry.register("!=", not_equals);
        registry.register("<", less_than);
        registry.register("<=", less_or_equal);
        registry.register(">", greater_than);
        registry.register(">=", greater_or_equal);
        registry.register("contains", contains);
        registry
    }
}

fn equals(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(lhs == rhs)
}

/// Exactly the inverse of `==`
fn not_equals(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(lhs != rhs)
}

fn less_than(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(compare(lhs, rhs) == Some(Ordering::Less))
}

fn less_or_equal(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(matches!(
        compare(lhs, rhs),
        Some(Ordering::Less | Ordering::Equal)
    ))
}

fn greater_than(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(compare(lhs, rhs) == Some(Ordering::Greater))
}

fn greater_or_equal(lhs: &Value, rhs: &Value) -> Value {
    Value::Boolean(matches!(
        compare(lhs, rhs),
        Some(Ordering::Greater | Ordering::Equal)
    ))
}

/// Array element containment, or substring containment for two strings.
/// Anything else is false.
fn contains(lhs: &Value, rhs: &Value) -> Value {
    let contained = match (lhs, rhs) {
        (Value::Array(array), needle) => {
            array.iter().any(|value| value == needle)
        }
        (Value::String(haystack), Value::String(needle)) => {
            haystack.contains(needle)
        }
        _ => false,
    };
    Value::Boolean(contained)
}

/// Ordering for the relational operators: numeric comparison for two
/// numerics (integer↔decimal coercion included), lexicographic comparison
/// for two strings. Incompatible pairs are unordered, which makes every
/// relational operator false.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            let a = lhs.as_decimal()?;
            let b = rhs.as_decimal()?;
            Some(a.cmp(&b))
        }
    }
}
