//! Runtime template values

use derive_more::From;
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::fmt::{self, Display};

/// A string-keyed, insertion-order-preserving map of values. This is the
/// shape of a template's global bindings and of the dictionary value variant.
pub type Dictionary = IndexMap<String, Value>;

/// A runtime template value. This is similar to a JSON value, except:
/// - Numbers are split into exact integers and exact decimals (no binary
///   floats, so `1.0 == 1` and `183.357 - 12 == 171.357` hold)
/// - Inclusive integer ranges are first-class
/// - `Empty` is the sentinel produced by the `empty` keyword
#[derive(Clone, Debug, Default, From)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
    #[from(skip)] // We use a generic impl instead
    Array(Vec<Self>),
    Dictionary(Dictionary),
    Range(Range),
    /// Sentinel equal to any empty string, array, or dictionary
    #[from(skip)]
    Empty,
}

impl Value {
    /// Convert this value to a boolean, according to its truthiness. Only
    /// nil and `false` are falsy; everything else (including `0`, the empty
    /// string, and the empty array) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Boolean(false))
    }

    /// View this value as an integer. Decimals qualify only when they have
    /// no fractional part; no other variant coerces.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Decimal(d) if d.fract().is_zero() => d.to_i64(),
            _ => None,
        }
    }

    /// View this value as a decimal. Integers widen exactly.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Integer(i) => Some(Decimal::from(*i)),
            Self::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// The element/character count exposed through the `size` path accessor
    pub fn size(&self) -> Option<i64> {
        match self {
            Self::String(s) => Some(s.chars().count() as i64),
            Self::Array(array) => Some(array.len() as i64),
            Self::Dictionary(dictionary) => Some(dictionary.len() as i64),
            Self::Range(range) => Some(range.len()),
            _ => None,
        }
    }

    /// Is this a collection (or string) with nothing in it? The `empty`
    /// sentinel compares equal to exactly these values.
    fn is_empty_collection(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Array(array) => array.is_empty(),
            Self::Dictionary(dictionary) => dictionary.is_empty(),
            _ => false,
        }
    }

    /// Convert a JSON value to a template value. JSON numbers map to
    /// integers when integral and to exact decimals otherwise.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(number) => {
                if let Some(i) = number.as_i64() {
                    Self::Integer(i)
                } else {
                    number
                        .as_f64()
                        .and_then(Decimal::from_f64_retain)
                        .map(Self::Decimal)
                        .unwrap_or_default()
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Dictionary(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Structural equality, with exactly one cross-type coercion:
/// integer↔decimal mathematical equality. The `empty` sentinel additionally
/// equals any empty string/array/dictionary.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Integer(i), Self::Decimal(d))
            | (Self::Decimal(d), Self::Integer(i)) => Decimal::from(*i) == *d,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Dictionary(a), Self::Dictionary(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Empty, Self::Empty) => true,
            (Self::Empty, value) | (value, Self::Empty) => {
                value.is_empty_collection()
            }
            _ => false,
        }
    }
}

/// The string-coercion rules shared by variable output and filters:
/// numbers print naturally, arrays concatenate their elements with no
/// separator, ranges print `lo..hi`, and nil/booleans/dictionaries print as
/// the empty string.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil
            | Self::Boolean(_)
            | Self::Dictionary(_)
            | Self::Empty => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
            Self::Array(array) => {
                for value in array {
                    write!(f, "{value}")?;
                }
                Ok(())
            }
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl<T> From<Vec<T>> for Value
where
    Value: From<T>,
{
    fn from(value: Vec<T>) -> Self {
        Self::Array(value.into_iter().map(Self::from).collect())
    }
}

impl<K, V> From<Vec<(K, V)>> for Value
where
    String: From<K>,
    Value: From<V>,
{
    fn from(value: Vec<(K, V)>) -> Self {
        Self::Dictionary(
            value
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::from_json(value)
    }
}

/// An inclusive integer interval, written `(lo..hi)` in templates
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of values in the interval. A reversed interval is empty.
    pub fn len(&self) -> i64 {
        (self.end - self.start + 1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand the interval into its values, in ascending order
    pub fn values(&self) -> Vec<Value> {
        (self.start..=self.end).map(Value::Integer).collect()
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
