//! End-to-end render tests: full templates through [Engine::render]

use crate::{
    Dictionary, Engine, RenderError, RenderWarning, Template,
    test_util::{
        assert_err, assert_matches, engine_with_test_filters, globals_of,
    },
};
use pretty_assertions::assert_eq;
use proptest::proptest;
use rstest::rstest;
use serde_json::json;

fn render(source: &str, globals: serde_json::Value) -> String {
    engine_with_test_filters()
        .render(source, globals_of(globals))
        .unwrap()
}

/// Templates with no tags or variables render to themselves
#[rstest]
#[case::empty("")]
#[case::plain("hello world")]
#[case::multiline("line one\nline two\r\nline three")]
#[case::utf8("💚 liquid 💙")]
fn test_text_passthrough(#[case] source: &str) {
    assert_eq!(render(source, json!({})), source);
}

#[rstest]
#[case::substitution(
    "aab {{ a }} {{b}}c{{c}}",
    json!({"a": "A", "b": "BB", "c": "CCcCC"}),
    "aab A BBcCCcCC",
)]
#[case::missing_variable("a{{ missing }}b", json!({}), "ab")]
#[case::dotted_path(
    "{{ user.name }}",
    json!({"user": {"name": "Sarah"}}),
    "Sarah",
)]
#[case::integer("{{ n }}", json!({"n": 650}), "650")]
#[case::decimal("{{ 1.5 }}", json!({}), "1.5")]
#[case::boolean_renders_empty("[{{ true }}]", json!({}), "[]")]
#[case::infix_in_variable("[{{ 650 > 100 }}]", json!({}), "[]")]
#[case::array_concatenation(
    "{{ items }}",
    json!({"items": ["a", 1, "b"]}),
    "a1b",
)]
#[case::range_literal("{{ (1..5) }}", json!({}), "1..5")]
fn test_variables(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::upcase("{{ name | upcase }}", json!({"name": "sarah"}), "SARAH")]
#[case::chain(
    "{{ name | upcase | append: '!' }}",
    json!({"name": "sarah"}),
    "SARAH!",
)]
#[case::unknown_aborts_with_last_value(
    "{{ name | bogus | upcase }}",
    json!({"name": "sarah"}),
    "sarah",
)]
fn test_filters(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::if_true_else(
    "{% if 650 > 100 %}T{% else %}F{% endif %}\
     {% if 650 < 100 %}T{% else %}F{% endif %}",
    json!({}),
    "TF",
)]
#[case::if_only("{% if x %}yes{% endif %}", json!({"x": 1}), "yes")]
#[case::if_falsy_zero_is_truthy("{% if x %}yes{% endif %}", json!({"x": 0}), "yes")]
#[case::if_nil("{% if x %}yes{% endif %}", json!({}), "")]
#[case::elsif_first("{% if a %}1{% elsif b %}2{% else %}3{% endif %}", json!({"a": true, "b": true}), "1")]
#[case::elsif_second("{% if a %}1{% elsif b %}2{% else %}3{% endif %}", json!({"b": true}), "2")]
#[case::elsif_else("{% if a %}1{% elsif b %}2{% else %}3{% endif %}", json!({}), "3")]
#[case::chains_are_independent(
    "{% if true %}T{% endif %}{% if false %}X{% else %}F{% endif %}",
    json!({}),
    "TF",
)]
#[case::nested(
    "{% if a %}{% if b %}ab{% else %}a{% endif %}{% endif %}",
    json!({"a": true}),
    "a",
)]
#[case::unless_falsy("{% unless x %}shown{% endunless %}", json!({}), "shown")]
#[case::unless_truthy("{% unless x %}shown{% endunless %}", json!({"x": 1}), "")]
#[case::boolean_connectors(
    "{% if x > 1 and y == 'a' %}both{% endif %}",
    json!({"x": 2, "y": "a"}),
    "both",
)]
#[case::contains_operator(
    "{% if 'hello' contains 'ell' %}y{% endif %}",
    json!({}),
    "y",
)]
#[case::decimal_integer_equality(
    "{% if 1.0 == 1 %}eq{% endif %}",
    json!({}),
    "eq",
)]
#[case::empty_keyword(
    "{% if things == empty %}none{% endif %}",
    json!({"things": []}),
    "none",
)]
fn test_conditionals(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::assign_literal(
    "{% assign x = 5 %}{% if x == 5 %}yes{% endif %}",
    json!({}),
    "yes",
)]
#[case::assign_filtered(
    "{% assign shout = name | upcase %}{{ shout }}",
    json!({"name": "sarah"}),
    "SARAH",
)]
#[case::assign_inside_loop_persists(
    "{% for i in (1..3) %}{% assign last = i %}{% endfor %}{{ last }}",
    json!({}),
    "3",
)]
#[case::capture(
    "{% capture greeting %}hi{% endcapture %}{{ greeting }}",
    json!({}),
    "hi",
)]
#[case::capture_renders_nothing_inline(
    "a{% capture g %}hidden{% endcapture %}b{{ g }}",
    json!({}),
    "abhidden",
)]
#[case::capture_with_variables(
    "{% capture line %}{{ name }}!{% endcapture %}[{{ line }}]",
    json!({"name": "Sarah"}),
    "[Sarah!]",
)]
fn test_assignment(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::counters(
    "{% increment c %} {% increment c %} {% decrement c %}",
    json!({}),
    "0 1 1",
)]
#[case::decrement_fresh("{% decrement c %}{% decrement c %}", json!({}), "-1-2")]
#[case::counter_variable_independence(
    "{% assign c = 'v' %}{% increment c %}{{ c }}",
    json!({}),
    "0v",
)]
fn test_counters(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::over_array(
    "{% for u in users %}{{u.name}}{% endfor %}{{users[1].email}}",
    json!({"users": [
        {"name": "John", "email": "john@x"},
        {"name": "Sarah", "email": "sarah@x"},
    ]}),
    "JohnSarahsarah@x",
)]
#[case::over_range("{% for i in (1..5) %}{{i}}{% endfor %}", json!({}), "12345")]
#[case::range_variable_endpoint(
    "{% for i in (1..n) %}{{i}}{% endfor %}",
    json!({"n": 3}),
    "123",
)]
#[case::loop_variable_shadowing(
    "{{ i }}{% for i in (7..8) %}{{ i }}{% endfor %}{{ i }}",
    json!({"i": "x"}),
    "x78x",
)]
#[case::nested(
    "{% for i in (1..2) %}{% for j in (1..2) %}{{i}}{{j}} {% endfor %}{% endfor %}",
    json!({}),
    "11 12 21 22 ",
)]
#[case::limit("{% for i in (1..5) limit: 3 %}{{i}}{% endfor %}", json!({}), "123")]
#[case::offset("{% for i in (1..5) offset: 2 %}{{i}}{% endfor %}", json!({}), "345")]
#[case::limit_offset(
    "{% for i in (1..5) limit: 3 offset: 1 %}{{i}}{% endfor %}",
    json!({}),
    "234",
)]
#[case::reversed("{% for i in (1..3) reversed %}{{i}}{% endfor %}", json!({}), "321")]
#[case::limit_clamps_past_end(
    "{% for i in (1..3) limit: 99 %}{{i}}{% endfor %}",
    json!({}),
    "123",
)]
#[case::offset_clamps_past_end(
    "{% for i in (1..3) offset: 99 %}{{i}}{% else %}none{% endfor %}",
    json!({}),
    "none",
)]
#[case::else_on_empty(
    "{% for x in missing %}x{% else %}none{% endfor %}",
    json!({}),
    "none",
)]
#[case::else_skipped_when_nonempty(
    "{% for i in (1..2) %}{{i}}{% else %}none{% endfor %}",
    json!({}),
    "12",
)]
#[case::scalar_iterable_is_empty(
    "{% for x in n %}x{% else %}none{% endfor %}",
    json!({"n": 5}),
    "none",
)]
fn test_for(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::break_ends_loop(
    "{% for i in (1..5) %}{% if i == 3 %}{% break %}{% endif %}{{i}}{% endfor %}",
    json!({}),
    "12",
)]
#[case::continue_skips_rest_of_pass(
    "{% for i in (1..5) %}{% if i == 3 %}{% continue %}{% endif %}{{i}}{% endfor %}",
    json!({}),
    "1245",
)]
#[case::break_only_inner_loop(
    "{% for i in (1..2) %}{% for j in (1..5) %}\
     {% if j == 2 %}{% break %}{% endif %}{{j}}{% endfor %}x{% endfor %}",
    json!({}),
    "1x1x",
)]
#[case::break_outside_loop_ignored("a{% break %}b", json!({}), "ab")]
fn test_break_continue(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

/// The forloop overlay exposes 1-based and 0-based indexes, reverse
/// indexes, length, and first/last flags
#[test]
fn test_forloop_object() {
    let source = "{% for i in (1..3) %}\
        {{ forloop.index }}:{{ forloop.index0 }}:\
        {{ forloop.rindex }}:{{ forloop.rindex0 }}:{{ forloop.length }}\
        {% if forloop.first %}:first{% endif %}\
        {% if forloop.last %}:last{% endif %} {% endfor %}";
    assert_eq!(
        render(source, json!({})),
        "1:0:3:2:3:first 2:1:2:1:3 3:2:1:0:3:last ",
    );
}

#[rstest]
#[case::first_when(
    "{% case x %}{% when 1 %}A{% when 2 %}B{% else %}C{% endcase %}",
    json!({"x": 1}),
    "A",
)]
#[case::second_when(
    "{% case x %}{% when 1 %}A{% when 2 %}B{% else %}C{% endcase %}",
    json!({"x": 2}),
    "B",
)]
#[case::else_branch(
    "{% case x %}{% when 1 %}A{% when 2 %}B{% else %}C{% endcase %}",
    json!({"x": 9}),
    "C",
)]
#[case::no_match_no_else(
    "{% case x %}{% when 1 %}A{% endcase %}",
    json!({"x": 9}),
    "",
)]
#[case::comma_values_or_match(
    "{% case x %}{% when 1, 2 %}low{% when 3 %}high{% endcase %}",
    json!({"x": 2}),
    "low",
)]
#[case::string_comparator(
    "{% case kind %}{% when 'a' %}A{% when 'b' %}B{% endcase %}",
    json!({"kind": "b"}),
    "B",
)]
#[case::interior_text_dropped(
    "{% case x %}ignored{% when 1 %}A{% endcase %}",
    json!({"x": 1}),
    "A",
)]
#[case::first_match_wins(
    "{% case x %}{% when 1 %}A{% when 1 %}again{% endcase %}",
    json!({"x": 1}),
    "A",
)]
fn test_case(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::alternates(
    "{% for i in (1..4) %}{% cycle 'a', 'b' %}{% endfor %}",
    json!({}),
    "abab",
)]
#[case::sibling_cycles_share_by_value_list(
    "{% cycle 'a', 'b' %}{% cycle 'a', 'b' %}",
    json!({}),
    "ab",
)]
#[case::distinct_lists_are_independent(
    "{% cycle 'a', 'b' %}{% cycle 'x', 'y' %}{% cycle 'a', 'b' %}",
    json!({}),
    "axb",
)]
#[case::grouped(
    "{% cycle group: 'g', 'a', 'b' %}{% cycle group: 'g', 'a', 'b' %}",
    json!({}),
    "ab",
)]
fn test_cycle(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[rstest]
#[case::comment(
    "a{% comment %}hidden {{ boom }} text{% endcomment %}b",
    json!({}),
    "ab",
)]
#[case::comment_hides_side_effects(
    "{% comment %}{% increment c %}{% endcomment %}{% increment c %}",
    json!({}),
    "0",
)]
#[case::raw(
    "{% raw %}{{ not_rendered }} {% if %}{% endraw %}",
    json!({}),
    "{{ not_rendered }} {% if %}",
)]
fn test_comment_and_raw(
    #[case] source: &str,
    #[case] globals: serde_json::Value,
    #[case] expected: &str,
) {
    assert_eq!(render(source, globals), expected);
}

#[test]
fn test_tablerow() {
    let source =
        "{% tablerow i in (1..6) cols: 2 %}{{i}}{% endtablerow %}";
    assert_eq!(
        render(source, json!({})),
        "<tr class=\"row1\"><td class=\"col1\">1</td>\
         <td class=\"col2\">2</td></tr>\
         <tr class=\"row2\"><td class=\"col1\">3</td>\
         <td class=\"col2\">4</td></tr>\
         <tr class=\"row3\"><td class=\"col1\">5</td>\
         <td class=\"col2\">6</td></tr>",
    );
}

#[test]
fn test_tablerow_partial_row() {
    let source =
        "{% tablerow i in (1..3) cols: 2 %}{{i}}{% endtablerow %}";
    assert_eq!(
        render(source, json!({})),
        "<tr class=\"row1\"><td class=\"col1\">1</td>\
         <td class=\"col2\">2</td></tr>\
         <tr class=\"row2\"><td class=\"col1\">3</td></tr>",
    );
}

#[test]
fn test_tablerow_default_cols_single_row() {
    let source = "{% tablerow i in (1..3) %}{{i}}{% endtablerow %}";
    assert_eq!(
        render(source, json!({})),
        "<tr class=\"row1\"><td class=\"col1\">1</td>\
         <td class=\"col2\">2</td><td class=\"col3\">3</td></tr>",
    );
}

#[test]
fn test_tablerow_empty_emits_nothing() {
    let source = "{% tablerow i in missing %}{{i}}{% endtablerow %}";
    assert_eq!(render(source, json!({})), "");
}

/// Unregistered tag keywords are skipped with a diagnostic
#[test]
fn test_unknown_tag_skipped() {
    assert_eq!(render("a{% bogus stuff %}b", json!({})), "ab");
}

/// Hard errors: grammar violations and bad parameter types
#[rstest]
#[case::assign_no_arguments("{% assign %}")]
#[case::assign_missing_value("{% assign x = %}")]
#[case::for_missing_in("{% for x items %}{% endfor %}")]
#[case::when_outside_case("{% when 1 %}")]
#[case::bad_limit("{% for i in (1..3) limit: 'x' %}{% endfor %}")]
#[case::bad_cols("{% tablerow i in (1..3) cols: 0 %}{% endtablerow %}")]
fn test_render_errors(#[case] source: &str) {
    let engine = Engine::new();
    let result = engine.render(source, Dictionary::new());
    assert_matches!(
        result,
        Err(RenderError::MalformedStatement { .. }
            | RenderError::InvalidInvocation { .. }),
    );
}

/// A failing filter evaluator aborts the render, and the error chain keeps
/// the filter's own message
#[test]
fn test_filter_error_aborts() {
    let mut engine = Engine::new();
    engine
        .filters_mut()
        .register("explode", |_: &crate::Value, _: &[crate::Value]| {
            Err(crate::FilterError::new("boom"))
        });
    let result = engine.render("{{ 1 | explode }}", Dictionary::new());
    assert_err!(result, "boom");
}

/// Unclosed scopes at EOF produce output plus a warning
#[test]
fn test_unbalanced_scopes_warn() {
    let engine = Engine::new();
    let report = engine
        .render_report(&Template::new("{% if true %}a"), Dictionary::new())
        .unwrap();
    assert_eq!(report.fragments.concat(), "a");
    assert_eq!(
        report.warnings,
        [RenderWarning::UnbalancedScopes {
            keyword: "if".into()
        }],
    );
}

/// Soft expression errors surface in the report while rendering continues
#[test]
fn test_soft_errors_reported() {
    let engine = Engine::new();
    let report = engine
        .render_report(
            &Template::new("a{{ 1user }}b"),
            Dictionary::new(),
        )
        .unwrap();
    assert_eq!(report.fragments.concat(), "ab");
    assert_matches!(
        report.warnings.as_slice(),
        [RenderWarning::MalformedExpression { .. }],
    );
}

/// Fragments come back in document order
#[test]
fn test_render_fragments() {
    let engine = Engine::new();
    let fragments = engine
        .render_fragments(
            &Template::new("a{{ 'b' }}c"),
            Dictionary::new(),
        )
        .unwrap();
    assert_eq!(fragments, ["a", "b", "c"]);
}

/// An engine is reusable: renders are independent, including counter and
/// cycle state
#[test]
fn test_renders_are_independent() {
    let engine = Engine::new();
    let source = "{% increment c %}{% cycle 'a', 'b' %}";
    assert_eq!(engine.render(source, Dictionary::new()).unwrap(), "0a");
    assert_eq!(engine.render(source, Dictionary::new()).unwrap(), "0a");
}

proptest! {
    /// Text passthrough for any delimiter-free template
    #[test]
    fn test_passthrough_prop(source in "[a-zA-Z0-9 .,!\n]{0,64}") {
        let engine = Engine::new();
        let rendered = engine.render(&source, Dictionary::new()).unwrap();
        assert_eq!(rendered, source);
    }
}
