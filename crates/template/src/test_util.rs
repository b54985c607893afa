//! Test-only helpers: assertion macros, proptest strategies, fixture
//! builders

use crate::{Dictionary, Engine, RenderContext, Value, value::Range};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Assert a result is the `Err` variant, and the stringified error chain
/// contains the given message
macro_rules! assert_err {
    ($e:expr, $msg:expr) => {{
        use itertools::Itertools as _;

        let msg = $msg;
        // Include all source errors so wrappers don't hide the important
        // stuff
        let error: anyhow::Error = $e.unwrap_err().into();
        let actual = error.chain().map(ToString::to_string).join(": ");
        assert!(
            actual.contains(msg),
            "Expected error message to contain {msg:?}, but was: {actual:?}"
        )
    }};
}

/// Assert the given expression matches a pattern
macro_rules! assert_matches {
    ($expr:expr, $pattern:pat $(,)?) => {
        match $expr {
            $pattern => (),
            value => panic!(
                "Unexpected value {value:?} does not match pattern {expected}",
                expected = stringify!($pattern),
            ),
        }
    };
}

pub(crate) use {assert_err, assert_matches};

/// Build a render context whose globals come from a JSON object
pub(crate) fn context_of(json: serde_json::Value) -> RenderContext {
    RenderContext::new(globals_of(json))
}

/// Build a globals dictionary from a JSON object
pub(crate) fn globals_of(json: serde_json::Value) -> Dictionary {
    match Value::from_json(json) {
        Value::Dictionary(dictionary) => dictionary,
        _ => Dictionary::new(),
    }
}

/// An engine with a few simple filters registered, enough to exercise
/// filter chains without dragging in a filter library
pub(crate) fn engine_with_test_filters() -> Engine {
    let mut engine = Engine::new();
    engine.filters_mut().register(
        "upcase",
        |value: &Value, _: &[Value]| {
            Ok(value.to_string().to_uppercase().into())
        },
    );
    engine.filters_mut().register(
        "downcase",
        |value: &Value, _: &[Value]| {
            Ok(value.to_string().to_lowercase().into())
        },
    );
    engine.filters_mut().register(
        "append",
        |value: &Value, arguments: &[Value]| {
            let mut text = value.to_string();
            for argument in arguments {
                text.push_str(&argument.to_string());
            }
            Ok(text.into())
        },
    );
    engine
}

/// Strategy for an arbitrary value, including nested collections
pub(crate) fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        decimal().prop_map(Value::Decimal),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
        (any::<i32>(), any::<i32>()).prop_map(|(start, end)| {
            Value::Range(Range::new(i64::from(start), i64::from(end)))
        }),
        Just(Value::Empty),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                .prop_map(|pairs| {
                    Value::Dictionary(pairs.into_iter().collect())
                }),
        ]
    })
}

/// Strategy for a numeric value (integer or decimal)
pub(crate) fn numeric() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        decimal().prop_map(Value::Decimal),
    ]
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..10).prop_map(|(mantissa, scale)| {
        Decimal::new(mantissa, scale)
    })
}
