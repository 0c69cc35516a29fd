//! Unit tests for template rendering

use pretty_assertions::assert_eq;
use sql_render::render::{evaluate, evaluate_with};
use sql_render::{check_parameters, render, render_with, ConditionGrammar, RenderOptions};

use crate::common::params;

// ============================================================================
// Parameter Substitution Tests
// ============================================================================

#[test]
fn test_plain_substitution() {
    let sql = render(
        "SELECT * FROM @schema.@table WHERE id = @id;",
        &params(&[("schema", "cdm"), ("table", "person"), ("id", "42")]),
    );
    assert_eq!(sql, "SELECT * FROM cdm.person WHERE id = 42;");
}

#[test]
fn test_missing_parameter_left_verbatim() {
    let sql = render("SELECT @a, @b;", &params(&[("a", "1")]));
    assert_eq!(sql, "SELECT 1, @b;");
}

#[test]
fn test_longer_name_not_corrupted_by_prefix() {
    let sql = render(
        "SELECT @cdm, @cdm_schema;",
        &params(&[("cdm", "x"), ("cdm_schema", "y")]),
    );
    assert_eq!(sql, "SELECT x, y;");
}

#[test]
fn test_parameter_values_are_not_rescanned() {
    let sql = render("@a", &params(&[("a", "@b"), ("b", "nope")]));
    assert_eq!(sql, "@b");
}

// ============================================================================
// Default Declaration Tests
// ============================================================================

#[test]
fn test_default_value() {
    assert_eq!(render("{DEFAULT @x = 5}@x", &params(&[])), "5");
}

#[test]
fn test_explicit_value_overrides_default() {
    assert_eq!(render("{DEFAULT @x = 5}@x", &params(&[("x", "9")])), "9");
}

#[test]
fn test_default_lines_removed() {
    let template = "{DEFAULT @schema = 'cdm'}\n{DEFAULT @limit = 10}\nSELECT TOP @limit * FROM @schema.person;";
    assert_eq!(
        render(template, &params(&[])),
        "SELECT TOP 10 * FROM cdm.person;"
    );
}

// ============================================================================
// Conditional Tests
// ============================================================================

#[test]
fn test_if_then_else() {
    assert_eq!(render("{true}?{A}:{B}", &params(&[])), "A");
    assert_eq!(render("{false}?{A}:{B}", &params(&[])), "B");
    assert_eq!(render("{false}?{A}", &params(&[])), "");
}

#[test]
fn test_nested_conditionals() {
    assert_eq!(render("{true}?{{false}?{X}:{Y}}", &params(&[])), "Y");
    assert_eq!(
        render(
            "{@a}?{a{@b}?{b}:{c}}:{d} {@b}?{e}",
            &params(&[("a", "1"), ("b", "0")])
        ),
        "ac "
    );
}

#[test]
fn test_condition_with_membership() {
    let template = "SELECT * FROM t{@dialect in ('postgresql', 'redshift')}?{ LIMIT 10};";
    assert_eq!(
        render(template, &params(&[("dialect", "postgresql")])),
        "SELECT * FROM t LIMIT 10;"
    );
    assert_eq!(
        render(template, &params(&[("dialect", "oracle")])),
        "SELECT * FROM t;"
    );
}

#[test]
fn test_condition_with_comparisons() {
    let template = "{@a == 1 & @b != 2}?{X}:{Y}";
    assert_eq!(render(template, &params(&[("a", "1"), ("b", "3")])), "X");
    assert_eq!(render(template, &params(&[("a", "1"), ("b", "2")])), "Y");
}

#[test]
fn test_unmatched_braces_stay_literal() {
    assert_eq!(render("{true}?{A} }", &params(&[])), "A }");
    assert_eq!(render("SELECT '{' + x;", &params(&[])), "SELECT '{' + x;");
}

#[test]
fn test_legacy_grammar() {
    let options = RenderOptions {
        grammar: ConditionGrammar::Legacy,
    };
    // The legacy grammar has no membership test, so the condition holds.
    assert_eq!(
        render_with("{x in (a)}?{A}:{B}", &params(&[]), &options),
        "A"
    );
    assert_eq!(
        render_with("{x == y}?{A}:{B}", &params(&[]), &options),
        "B"
    );
}

// ============================================================================
// Condition Evaluator Tests
// ============================================================================

#[test]
fn test_evaluate_membership() {
    assert!(evaluate("a in (a,b,c)"));
    assert!(!evaluate("d in (a,b,c)"));
}

#[test]
fn test_evaluate_groups() {
    assert!(evaluate("(true & false) | true"));
    assert!(!evaluate("(a == b) | (c in (d, e))"));
}

#[test]
fn test_evaluate_legacy() {
    assert!(!evaluate_with("false", ConditionGrammar::Legacy));
    assert!(evaluate_with("(true & false)", ConditionGrammar::Legacy));
}

// ============================================================================
// Parameter Check Tests
// ============================================================================

#[test]
fn test_check_parameters() {
    let warnings = check_parameters("SELECT * FROM @schema.person;", ["schema", "limit"]);
    assert_eq!(warnings, vec!["Parameter 'limit' not found in SQL"]);
}
