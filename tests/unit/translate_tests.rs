//! Unit tests for pattern translation

use pretty_assertions::assert_eq;
use sql_render::{
    check_identifiers, generate_session_id, translate, translate_bigquery, translate_with,
    validate_session_id, ReplacementRule, SqlRenderError, TranslateOptions,
};

use crate::common::{options, SESSION_ID};

fn rule(search: &str, replace: &str) -> Vec<ReplacementRule> {
    vec![ReplacementRule::new(search, replace)]
}

// ============================================================================
// Search and Replace Tests
// ============================================================================

#[test]
fn test_drop_table_if_exists() {
    let sql = "IF OBJECT_ID('cohort','U') IS NOT NULL DROP TABLE cohort;";
    let rules = rule(
        "IF OBJECT_ID('@table', 'U') IS NOT NULL DROP TABLE @table;",
        "TRUNCATE TABLE @table;\nDROP TABLE @table;",
    );
    assert_eq!(
        translate(sql, &rules).unwrap(),
        "TRUNCATE TABLE cohort;\nDROP TABLE cohort;"
    );
}

#[test]
fn test_keywords_match_case_insensitively() {
    let rules = rule("DATEADD(dd,@days,@date)", "(@date + @days)");
    assert_eq!(
        translate("select dateadd(DD,1,start_date) from t;", &rules).unwrap(),
        "select (start_date + 1) from t;"
    );
}

#[test]
fn test_comments_between_tokens() {
    let rules = rule("GETDATE()", "CURRENT_DATE");
    assert_eq!(
        translate("SELECT GETDATE /* now */ ();", &rules).unwrap(),
        "SELECT CURRENT_DATE;"
    );
}

#[test]
fn test_capture_does_not_span_statements() {
    let rules = rule("DROP TABLE @t IF EXISTS", "x");
    let sql = "DROP TABLE a; SELECT 1 IF EXISTS";
    assert_eq!(translate(sql, &rules).unwrap(), sql);
}

#[test]
fn test_capture_stays_inside_brackets() {
    let rules = rule("COUNT(@a) AS @b FROM", "x");
    let sql = "SELECT COUNT(DISTINCT (x)) AS n FROM t";
    assert_eq!(translate(sql, &rules).unwrap(), "SELECT x t");

    // Without the bracket check `@b` would capture "n) ".
    let sql = "SELECT f(COUNT(y) AS n) FROM t";
    assert_eq!(translate(sql, &rules).unwrap(), sql);
}

#[test]
fn test_pattern_literals_inside_quotes_are_skipped() {
    let rules = rule("GETDATE()", "CURRENT_DATE");
    let sql = "SELECT 'GETDATE()' AS label;";
    assert_eq!(translate(sql, &rules).unwrap(), sql);
}

#[test]
fn test_capture_keeps_whitespace_before_boundary() {
    let rules = rule("CAST(@a AS VARCHAR)", "CAST(@a AS TEXT)");
    assert_eq!(
        translate("SELECT CAST(x AS VARCHAR);", &rules).unwrap(),
        "SELECT CAST(x  AS TEXT);"
    );
}

#[test]
fn test_regex_placeholder() {
    let rules = rule("CAST(@a AS @(varchar|nvarchar)t(max))", "CAST(@a AS TEXT)");
    assert_eq!(
        translate("SELECT CAST(x AS VARCHAR(MAX));", &rules).unwrap(),
        "SELECT CAST(x  AS TEXT);"
    );
    assert_eq!(
        translate("SELECT CAST(x AS INT(MAX));", &rules).unwrap(),
        "SELECT CAST(x AS INT(MAX));"
    );
}

#[test]
fn test_idempotent_when_nothing_matches() {
    let rules = vec![
        ReplacementRule::new("ISNULL(@a,@b)", "COALESCE(@a,@b)"),
        ReplacementRule::new("GETDATE()", "CURRENT_DATE"),
    ];
    let once = translate("SELECT ISNULL(a, GETDATE()) FROM t;", &rules).unwrap();
    assert_eq!(once, "SELECT COALESCE(a,CURRENT_DATE) FROM t;");
    assert_eq!(translate(&once, &rules).unwrap(), once);
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_pattern_must_not_start_or_end_with_variable() {
    for search in ["@a = 1", "x = @a"] {
        let err = translate("x = 1", &rule(search, "")).unwrap_err();
        assert!(
            matches!(err, SqlRenderError::InvalidPattern { .. }),
            "{}: {:?}",
            search,
            err
        );
    }
}

#[test]
fn test_invalid_regex_placeholder() {
    let err = translate("x", &rule("x @([)y", "")).unwrap_err();
    assert!(matches!(err, SqlRenderError::InvalidRegex { .. }));
}

#[test]
fn test_later_rules_not_applied_after_error() {
    let rules = vec![
        ReplacementRule::new("GETDATE()", "CURRENT_DATE"),
        ReplacementRule::new("@bad", ""),
    ];
    assert!(translate("SELECT GETDATE();", &rules).is_err());
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_session_placeholder() {
    let rules = rule("CREATE TABLE #@t (", "CREATE TABLE %temp_prefix%t_%session_id%_@t (");
    assert_eq!(
        translate_with("CREATE TABLE #tmp(x INT);", &rules, &options(None)).unwrap(),
        format!("CREATE TABLE t_{}_tmp (x INT);", SESSION_ID)
    );
    assert_eq!(
        translate_with("CREATE TABLE #tmp(x INT);", &rules, &options(Some("temp"))).unwrap(),
        format!("CREATE TABLE temp.t_{}_tmp (x INT);", SESSION_ID)
    );
}

#[test]
fn test_default_session_is_shared() {
    let rules = rule("x;", "%session_id%;");
    let first = translate("x;", &rules).unwrap();
    let second = translate_with("x;", &rules, &TranslateOptions::default()).unwrap();
    assert_eq!(first, second);
    validate_session_id(first.trim_end_matches(';')).unwrap();
}

#[test]
fn test_generated_session_ids_differ() {
    let ids: std::collections::HashSet<String> = (0..20).map(|_| generate_session_id()).collect();
    assert!(ids.len() > 1);
}

// ============================================================================
// BigQuery Tests
// ============================================================================

#[test]
fn test_bigquery_chained_cte_column_lists() {
    assert_eq!(
        translate_bigquery(
            "WITH a (x) AS (SELECT 1 FROM t), b (y) AS (SELECT 2 FROM u) SELECT x FROM a, b;"
        )
        .unwrap(),
        "with a as (select 1 as x from t), b as (select 2 as y from u) select x from a, b;"
    );
}

#[test]
fn test_bigquery_nested_group_by() {
    assert_eq!(
        translate_bigquery(
            "SELECT * FROM (SELECT LEFT(c, 2), COUNT(*) AS n FROM t GROUP BY LEFT(c, 2)) s;"
        )
        .unwrap(),
        "select * from (select left(c, 2), count(*) as n from t group by 1) s;"
    );
}

#[test]
fn test_bigquery_leaves_literals_alone() {
    assert_eq!(
        translate_bigquery("SELECT 'A + B' AS label FROM t;").unwrap(),
        "select 'A + B' as label from t;"
    );
}

// ============================================================================
// Identifier Check Tests
// ============================================================================

#[test]
fn test_check_identifiers() {
    let sql = "CREATE TABLE #a_rather_long_temp_table_name (x INT);\n\
               CREATE TABLE results_of_a_rather_long_analysis_step (x INT);\n\
               CREATE TABLE ok (x INT);";
    let warnings = check_identifiers(sql);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].contains("#a_rather_long_temp_table_name"));
    assert!(warnings[1].contains("results_of_a_rather_long_analysis_step"));
}
