//! Expression parsing and evaluation
//!
//! Covers the three surface grammars that appear inside `{{ … }}` payloads
//! and tag arguments:
//!
//! - literals and variable paths (the *terms* everything else is built from)
//! - filter chains: `term | name | name: arg1, arg2`
//! - infix boolean expressions: whitespace-split tokens folded
//!   right-to-left with no precedence and no parentheses
//!
//! Expression-level failures are soft: they are recorded on the render
//! context and the offending sub-expression evaluates to nil. Only filter
//! evaluator failures are hard errors.

use crate::{
    Engine,
    context::RenderContext,
    error::{RenderError, RenderWarning},
    value::{Range, Value},
};
use rust_decimal::Decimal;
use tracing::warn;
use winnow::{
    ModalParser, ModalResult, Parser,
    ascii::{digit1, multispace0},
    combinator::{
        alt, cut_err, delimited, opt, preceded, repeat, separated,
        separated_pair, terminated,
    },
    error::ContextError,
    token::{one_of, take_till, take_until, take_while},
};

/// A parsed term: the atom of every expression grammar
#[derive(Clone, Debug, PartialEq)]
enum Term {
    Literal(Value),
    Path(Vec<PathSegment>),
    Range(RangeBound, RangeBound),
}

/// One step of a dotted/bracketed variable path
#[derive(Clone, Debug, PartialEq)]
enum PathSegment {
    /// `.name` or `["name"]`
    Key(String),
    /// `[2]`
    Index(i64),
    /// `[name]`: the identifier resolves against the context to a key or
    /// index
    Dynamic(String),
}

/// A range endpoint: an integer literal or a variable resolving to one
#[derive(Clone, Debug, PartialEq)]
enum RangeBound {
    Literal(i64),
    Variable(Vec<PathSegment>),
}

/// One segment of a filter chain: `name` or `name: arg1, arg2`
#[derive(Debug, PartialEq)]
struct FilterCall {
    name: String,
    arguments: Vec<Term>,
}

/// Evaluate a `{{ … }}` payload: a filter chain when it contains a
/// top-level pipe, an infix expression (which degenerates to a single term)
/// otherwise
pub(crate) fn evaluate_payload(
    payload: &str,
    context: &mut RenderContext,
    engine: &Engine,
) -> Result<Value, RenderError> {
    if split_top_level(payload, '|').len() > 1 {
        evaluate_filter_chain(payload, context, engine)
    } else {
        Ok(evaluate_condition(payload, context, engine))
    }
}

/// Evaluate a pipe-separated filter chain. An unknown filter name aborts
/// the chain and yields the last good value; a failing filter evaluator is
/// a hard error.
pub(crate) fn evaluate_filter_chain(
    payload: &str,
    context: &mut RenderContext,
    engine: &Engine,
) -> Result<Value, RenderError> {
    let (head, calls) = match filter_chain.parse(payload) {
        Ok(parsed) => parsed,
        Err(error) => {
            context.record(RenderWarning::MalformedExpression {
                fragment: payload.to_owned(),
                reason: error.to_string(),
            });
            return Ok(Value::Nil);
        }
    };

    let mut value = evaluate_term(&head, context);
    for call in calls {
        let Some(filter) = engine.filters().get(&call.name) else {
            warn!(name = %call.name, "unknown filter, aborting chain");
            context.record(RenderWarning::UnknownFilter { name: call.name });
            return Ok(value);
        };
        let arguments: Vec<Value> = call
            .arguments
            .iter()
            .map(|argument| evaluate_term(argument, context))
            .collect();
        value = filter(&value, &arguments).map_err(|source| {
            RenderError::Filter {
                filter: call.name.clone(),
                source,
            }
        })?;
    }
    Ok(value)
}

/// Evaluate an infix boolean expression: whitespace-split tokens, folded
/// right-to-left. `pop value, pop operator, pop value, apply`; `and`/`or`
/// combine group results using truthiness. A single-token payload
/// evaluates to that term's value.
pub(crate) fn evaluate_condition(
    payload: &str,
    context: &mut RenderContext,
    engine: &Engine,
) -> Value {
    let Ok(tokens) = infix_tokens.parse(payload) else {
        context.record(RenderWarning::MalformedExpression {
            fragment: payload.to_owned(),
            reason: "cannot split into tokens".into(),
        });
        return Value::Nil;
    };
    if tokens.is_empty() {
        context.record(RenderWarning::MalformedExpression {
            fragment: payload.to_owned(),
            reason: "empty expression".into(),
        });
        return Value::Nil;
    }

    let mut index = tokens.len() - 1;
    let mut accumulated = evaluate_term_text(&tokens[index], context);
    while index > 0 {
        index -= 1;
        let token = tokens[index].as_str();
        if token == "and" || token == "or" {
            if index == 0 {
                context.record(RenderWarning::MalformedExpression {
                    fragment: payload.to_owned(),
                    reason: format!("stray `{token}` connector"),
                });
                return Value::Nil;
            }
            index -= 1;
            let mut current = evaluate_term_text(&tokens[index], context);
            // The left group may itself be a comparison
            if index >= 2
                && let Some(operator) = engine.operators().get(&tokens[index - 1])
            {
                let lhs = evaluate_term_text(&tokens[index - 2], context);
                current = operator(&lhs, &current);
                index -= 2;
            }
            let combined = if token == "and" {
                current.is_truthy() && accumulated.is_truthy()
            } else {
                current.is_truthy() || accumulated.is_truthy()
            };
            accumulated = Value::Boolean(combined);
        } else if let Some(operator) = engine.operators().get(token) {
            if index == 0 {
                context.record(RenderWarning::MalformedExpression {
                    fragment: payload.to_owned(),
                    reason: format!("`{token}` is missing its left operand"),
                });
                return Value::Nil;
            }
            index -= 1;
            let lhs = evaluate_term_text(&tokens[index], context);
            accumulated = operator(&lhs, &accumulated);
        } else if !token.chars().all(is_identifier_char) {
            // Operator-shaped but not registered: degrade to the value
            // accumulated so far
            warn!(name = token, "unknown operator");
            context.record(RenderWarning::UnknownOperator {
                name: token.to_owned(),
            });
            return accumulated;
        } else {
            context.record(RenderWarning::MalformedExpression {
                fragment: payload.to_owned(),
                reason: format!("`{token}` found in operator position"),
            });
            return Value::Nil;
        }
    }
    accumulated
}

/// Parse and evaluate a single term (a literal or a variable reference).
/// Anything unparseable records a diagnostic and evaluates to nil.
pub(crate) fn evaluate_term_text(
    word: &str,
    context: &mut RenderContext,
) -> Value {
    match ws(term).parse(word) {
        Ok(term) => evaluate_term(&term, context),
        Err(_) => {
            context.record(RenderWarning::MalformedExpression {
                fragment: word.to_owned(),
                reason: "expected a literal or variable".into(),
            });
            Value::Nil
        }
    }
}

/// Split on a separator, ignoring separators inside quoted strings
pub(crate) fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    for (offset, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == separator => {
                pieces.push(&input[start..offset]);
                start = offset + c.len_utf8();
            }
            None => {}
        }
    }
    pieces.push(&input[start..]);
    pieces
}

fn evaluate_term(term: &Term, context: &mut RenderContext) -> Value {
    match term {
        Term::Literal(value) => value.clone(),
        Term::Path(segments) => resolve_path(segments, context),
        Term::Range(start, end) => {
            let (Some(start), Some(end)) = (
                resolve_bound(start, context),
                resolve_bound(end, context),
            ) else {
                context.record(RenderWarning::MalformedExpression {
                    fragment: "range".into(),
                    reason: "range endpoints must resolve to integers".into(),
                });
                return Value::Nil;
            };
            Value::Range(Range::new(start, end))
        }
    }
}

fn resolve_bound(bound: &RangeBound, context: &RenderContext) -> Option<i64> {
    match bound {
        RangeBound::Literal(i) => Some(*i),
        RangeBound::Variable(segments) => {
            resolve_path(segments, context).as_integer()
        }
    }
}

/// Resolve a variable path against the context. Missing variables and
/// mistyped accesses resolve to nil.
fn resolve_path(segments: &[PathSegment], context: &RenderContext) -> Value {
    let mut iterator = segments.iter();
    let Some(first) = iterator.next() else {
        return Value::Nil;
    };
    let mut current = match first {
        PathSegment::Key(name) | PathSegment::Dynamic(name) => {
            context.lookup(name).cloned().unwrap_or_default()
        }
        PathSegment::Index(_) => Value::Nil,
    };
    for segment in iterator {
        current = match segment {
            PathSegment::Key(key) => access_key(current, key),
            PathSegment::Index(index) => access_index(current, *index),
            PathSegment::Dynamic(name) => {
                match context.lookup(name).cloned().unwrap_or_default() {
                    Value::String(key) => access_key(current, &key),
                    Value::Integer(index) => access_index(current, index),
                    _ => Value::Nil,
                }
            }
        };
    }
    current
}

/// Access a key on a value: dictionary lookup, or one of the `first`/
/// `last`/`size` accessors
fn access_key(current: Value, key: &str) -> Value {
    match current {
        Value::Dictionary(mut dictionary) => {
            if let Some(value) = dictionary.swap_remove(key) {
                value
            } else if key == "size" {
                Value::Integer(dictionary.len() as i64)
            } else {
                Value::Nil
            }
        }
        Value::Array(mut array) => match key {
            "first" if !array.is_empty() => array.swap_remove(0),
            "last" => array.pop().unwrap_or_default(),
            "size" => Value::Integer(array.len() as i64),
            _ => Value::Nil,
        },
        other if key == "size" => {
            other.size().map(Value::Integer).unwrap_or_default()
        }
        _ => Value::Nil,
    }
}

/// Index into an array. Negative indexes count from the end.
fn access_index(current: Value, index: i64) -> Value {
    match current {
        Value::Array(mut array) => {
            let len = array.len() as i64;
            let index = if index < 0 { index + len } else { index };
            if (0..len).contains(&index) {
                array.swap_remove(index as usize)
            } else {
                Value::Nil
            }
        }
        _ => Value::Nil,
    }
}

pub(crate) fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_identifier_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Parse a full filter chain: a head term plus zero or more pipe segments
fn filter_chain(input: &mut &str) -> ModalResult<(Term, Vec<FilterCall>)> {
    (
        ws(term),
        // Once we've hit a |, the only option is a filter call
        repeat(0.., preceded('|', cut_err(ws(filter_call)))),
    )
        .parse_next(input)
}

/// Parse one filter segment: `name` or `name: arg1, arg2`
fn filter_call(input: &mut &str) -> ModalResult<FilterCall> {
    (
        identifier,
        opt(preceded(ws(':'), separated(1.., ws(term), ','))),
    )
        .map(|(name, arguments): (&str, Option<Vec<Term>>)| FilterCall {
            name: name.to_owned(),
            arguments: arguments.unwrap_or_default(),
        })
        .parse_next(input)
}

/// Parse a term: a range, literal, or variable path
fn term(input: &mut &str) -> ModalResult<Term> {
    alt((
        range_term,
        terminated(literal, boundary).map(Term::Literal),
        path.map(Term::Path),
    ))
    .parse_next(input)
}

/// Parse a literal: nil/null, booleans, the `empty` sentinel, numbers,
/// quoted strings (no escapes)
fn literal(input: &mut &str) -> ModalResult<Value> {
    alt((
        "nil".value(Value::Nil),
        "null".value(Value::Nil),
        "true".value(Value::Boolean(true)),
        "false".value(Value::Boolean(false)),
        "empty".value(Value::Empty),
        number,
        quoted_string.map(Value::String),
    ))
    .parse_next(input)
}

/// Parse a signed number: `-?[0-9]+(\.[0-9]+)?`. A decimal point makes it
/// an exact decimal, otherwise it's an integer.
fn number(input: &mut &str) -> ModalResult<Value> {
    alt((
        (opt('-'), digit1, '.', digit1)
            .take()
            .try_map(str::parse::<Decimal>)
            .map(Value::Decimal),
        (opt('-'), digit1)
            .take()
            .try_map(str::parse::<i64>)
            .map(Value::Integer),
    ))
    .parse_next(input)
}

/// Parse a single- or double-quoted string. There are no escape sequences;
/// the first matching quote ends the literal.
fn quoted_string(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('\'', take_until(0.., '\''), '\''),
        delimited('"', take_until(0.., '"'), '"'),
    ))
    .map(|s: &str| s.to_owned())
    .parse_next(input)
}

/// Parse a range literal `(start..end)`; each endpoint is an integer
/// literal or a variable path
fn range_term(input: &mut &str) -> ModalResult<Term> {
    delimited(
        '(',
        separated_pair(ws(range_bound), "..", ws(range_bound)),
        ')',
    )
    .map(|(start, end)| Term::Range(start, end))
    .parse_next(input)
}

fn range_bound(input: &mut &str) -> ModalResult<RangeBound> {
    alt((
        (opt('-'), digit1)
            .take()
            .try_map(str::parse::<i64>)
            .map(RangeBound::Literal),
        path.map(RangeBound::Variable),
    ))
    .parse_next(input)
}

/// Parse a dotted/bracketed variable path: `a.b[2].c`, `a["key"]`,
/// `users[i].email`
fn path(input: &mut &str) -> ModalResult<Vec<PathSegment>> {
    (
        identifier.map(|id: &str| PathSegment::Key(id.to_owned())),
        repeat(0.., path_segment),
    )
        .map(|(first, rest): (_, Vec<PathSegment>)| {
            let mut segments = vec![first];
            segments.extend(rest);
            segments
        })
        .parse_next(input)
}

fn path_segment(input: &mut &str) -> ModalResult<PathSegment> {
    alt((
        preceded('.', identifier)
            .map(|id: &str| PathSegment::Key(id.to_owned())),
        delimited('[', ws(bracket_segment), ']'),
    ))
    .parse_next(input)
}

/// The interior of a bracket: a quoted key, an index, or an identifier
/// resolved at evaluation time
fn bracket_segment(input: &mut &str) -> ModalResult<PathSegment> {
    alt((
        quoted_string.map(PathSegment::Key),
        (opt('-'), digit1)
            .take()
            .try_map(str::parse::<i64>)
            .map(PathSegment::Index),
        identifier.map(|id: &str| PathSegment::Dynamic(id.to_owned())),
    ))
    .parse_next(input)
}

/// Parse an identifier: `[A-Za-z_][A-Za-z0-9_\-]*`
fn identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (
        one_of(is_identifier_first_char),
        take_while(0.., is_identifier_char),
    )
        .take()
        .parse_next(input)
}

/// Split an infix payload into whitespace-separated tokens, keeping quoted
/// strings (and their quotes) intact
fn infix_tokens(input: &mut &str) -> ModalResult<Vec<String>> {
    preceded(
        multispace0,
        repeat(0.., terminated(infix_token, multispace0)),
    )
    .parse_next(input)
}

fn infix_token(input: &mut &str) -> ModalResult<String> {
    alt((
        ('\'', take_until(0.., '\''), '\'').take(),
        ('"', take_until(0.., '"'), '"').take(),
        take_till(1.., char::is_whitespace),
    ))
    .map(|s: &str| s.to_owned())
    .parse_next(input)
}

/// Detect the end of a token without consuming input, so that e.g. `1user`
/// doesn't parse as a number with lingering input
fn boundary(input: &mut &str) -> ModalResult<()> {
    winnow::combinator::not(one_of(is_identifier_char)).parse_next(input)
}

/// Wrap a parser to allow whitespace on either side of it
fn ws<'a, O, F>(parser: F) -> impl ModalParser<&'a str, O, ContextError>
where
    F: ModalParser<&'a str, O, ContextError>,
{
    delimited(multispace0, parser, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FilterError,
        test_util::{context_of, engine_with_test_filters},
        value::Dictionary,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    /// Evaluate a term against a canned context
    fn term_value(word: &str) -> Value {
        let mut context = context_of(json!({
            "name": "Sarah",
            "count": 5,
            "items": ["a", "b", "c"],
            "users": [
                {"name": "John", "email": "john@x"},
                {"name": "Sarah", "email": "sarah@x"},
            ],
            "settings": {"theme": "dark"},
            "key": "theme",
            "i": 1,
        }));
        evaluate_term_text(word, &mut context)
    }

    #[rstest]
    #[case::nil("nil", Value::Nil)]
    #[case::null("null", Value::Nil)]
    #[case::bool_true("true", true.into())]
    #[case::bool_false("false", false.into())]
    #[case::empty("empty", Value::Empty)]
    #[case::integer("17", 17.into())]
    #[case::negative_integer("-10", (-10).into())]
    #[case::decimal("3.14", Value::Decimal("3.14".parse().unwrap()))]
    #[case::negative_decimal("-0.5", Value::Decimal("-0.5".parse().unwrap()))]
    #[case::single_quoted("'hello'", "hello".into())]
    #[case::double_quoted("\"hello\"", "hello".into())]
    #[case::empty_string("''", "".into())]
    #[case::no_escapes(r"'a\b'", r"a\b".into())]
    fn test_literal(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(term_value(input), expected);
    }

    #[rstest]
    #[case::variable("name", "Sarah".into())]
    #[case::missing("nonexistent", Value::Nil)]
    #[case::keyword_prefix("nullable", Value::Nil)]
    #[case::dotted("settings.theme", "dark".into())]
    #[case::indexed("items[1]", "b".into())]
    #[case::negative_index("items[-1]", "c".into())]
    #[case::out_of_range("items[10]", Value::Nil)]
    #[case::nested("users[0].name", "John".into())]
    #[case::quoted_key("settings[\"theme\"]", "dark".into())]
    #[case::dynamic_key("settings[key]", "dark".into())]
    #[case::dynamic_index("users[i].email", "sarah@x".into())]
    #[case::first("items.first", "a".into())]
    #[case::last("items.last", "c".into())]
    #[case::array_size("items.size", 3.into())]
    #[case::string_size("name.size", 5.into())]
    #[case::dictionary_size("settings.size", 1.into())]
    #[case::index_into_scalar("count[0]", Value::Nil)]
    fn test_path(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(term_value(input), expected);
    }

    #[rstest]
    #[case::literal_bounds("(1..5)", Value::Range(Range::new(1, 5)))]
    #[case::variable_bound("(1..count)", Value::Range(Range::new(1, 5)))]
    #[case::negative("(-2..2)", Value::Range(Range::new(-2, 2)))]
    #[case::bad_bound("(1..name)", Value::Nil)]
    fn test_range(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(term_value(input), expected);
    }

    /// Malformed terms resolve to nil and record a diagnostic
    #[rstest]
    #[case::leading_digit("1user")]
    #[case::leading_dash("-user")]
    #[case::unclosed_quote("'oops")]
    #[case::trailing_dot("user.")]
    fn test_malformed_term(#[case] input: &str) {
        let mut context = context_of(json!({}));
        assert_eq!(evaluate_term_text(input, &mut context), Value::Nil);
        assert_eq!(context.warnings().len(), 1);
    }

    #[rstest]
    #[case::no_filters("'liquid'", "liquid".into())]
    #[case::single("'liquid' | upcase", "LIQUID".into())]
    #[case::chained("'liquid' | upcase | append: '!'", "LIQUID!".into())]
    #[case::with_arguments("'a' | append: 'b', 'c'", "abc".into())]
    #[case::variable_argument("'Hello ' | append: name", "Hello Sarah".into())]
    #[case::quoted_pipe("'a|b' | upcase", "A|B".into())]
    fn test_filter_chain(#[case] payload: &str, #[case] expected: Value) {
        let engine = engine_with_test_filters();
        let mut context = context_of(json!({"name": "Sarah"}));
        let value =
            evaluate_filter_chain(payload, &mut context, &engine).unwrap();
        assert_eq!(value, expected);
    }

    /// An unknown filter aborts the chain and returns the last good value
    #[test]
    fn test_filter_chain_unknown_filter() {
        let engine = engine_with_test_filters();
        let mut context = context_of(json!({}));
        let value =
            evaluate_filter_chain("'a' | bogus | upcase", &mut context, &engine)
                .unwrap();
        assert_eq!(value, "a".into());
        assert_eq!(
            context.warnings(),
            [RenderWarning::UnknownFilter {
                name: "bogus".into()
            }],
        );
    }

    /// A failing filter evaluator is a hard error
    #[test]
    fn test_filter_chain_filter_error() {
        let mut engine = engine_with_test_filters();
        engine
            .filters_mut()
            .register("explode", |_: &Value, _: &[Value]| {
                Err(FilterError::new("boom"))
            });
        let mut context = context_of(json!({}));
        let error =
            evaluate_filter_chain("'a' | explode", &mut context, &engine)
                .unwrap_err();
        assert!(matches!(error, RenderError::Filter { .. }), "{error:?}");
    }

    #[rstest]
    #[case::single_value("count", 5.into())]
    #[case::comparison_true("650 > 100", true.into())]
    #[case::comparison_false("650 < 100", false.into())]
    #[case::equality("count == 5", true.into())]
    #[case::inequality("count != 5", false.into())]
    #[case::string_equality("name == 'Sarah'", true.into())]
    #[case::contains("name contains 'ara'", true.into())]
    #[case::and_true("count == 5 and name == 'Sarah'", true.into())]
    #[case::and_false("count == 5 and name == 'John'", false.into())]
    #[case::or_rescues("count == 0 or name == 'Sarah'", true.into())]
    #[case::connector_with_plain_value("count and name", true.into())]
    #[case::truthy_missing_both("missing or also_missing", false.into())]
    // Right-to-left: `true or (false and false)` is true; left-to-right
    // with no precedence would give `(true or false) and false` = false
    #[case::right_to_left("true or false and false", true.into())]
    fn test_condition(#[case] payload: &str, #[case] expected: Value) {
        let engine = Engine::new();
        let mut context = context_of(json!({"count": 5, "name": "Sarah"}));
        assert_eq!(
            evaluate_condition(payload, &mut context, &engine),
            expected,
        );
    }

    /// Malformed infix sequences record a diagnostic and evaluate to nil
    #[rstest]
    #[case::stray_connector("and x")]
    #[case::missing_operand("== 5")]
    #[case::adjacent_values("a b")]
    #[case::empty("")]
    fn test_condition_malformed(#[case] payload: &str) {
        let engine = Engine::new();
        let mut context = context_of(json!({}));
        assert_eq!(
            evaluate_condition(payload, &mut context, &engine),
            Value::Nil,
        );
        assert!(!context.warnings().is_empty());
    }

    /// An operator-shaped token that isn't registered degrades to the
    /// accumulated value
    #[test]
    fn test_condition_unknown_operator() {
        let engine = Engine::new();
        let mut context = context_of(json!({}));
        let value = evaluate_condition("1 <> 2", &mut context, &engine);
        assert_eq!(value, 2.into());
        assert_eq!(
            context.warnings(),
            [RenderWarning::UnknownOperator { name: "<>".into() }],
        );
    }

    #[rstest]
    #[case::no_separator("abc", vec!["abc"])]
    #[case::split("a|b|c", vec!["a", "b", "c"])]
    #[case::quoted("'a|b'|c", vec!["'a|b'", "c"])]
    #[case::empty_pieces("|", vec!["", ""])]
    fn test_split_top_level(
        #[case] input: &str,
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(split_top_level(input, '|'), expected);
    }

    /// `evaluate_payload` dispatches on the presence of a top-level pipe
    #[rstest]
    #[case::pipe("'a' | upcase", "A".into())]
    #[case::infix("1 < 2", true.into())]
    #[case::plain("'x'", "x".into())]
    fn test_payload_dispatch(#[case] payload: &str, #[case] expected: Value) {
        let engine = engine_with_test_filters();
        let mut context = RenderContext::new(Dictionary::new());
        let value =
            evaluate_payload(payload, &mut context, &engine).unwrap();
        assert_eq!(value, expected);
    }
}
