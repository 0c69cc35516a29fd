//! Render -> translate -> split over the fixture rule table

use pretty_assertions::assert_eq;
use sql_render::{check_identifiers, render, split, translate_to_dialect, TranslateOptions};

use crate::common::{fixture_table, options, params, SESSION_ID};

const COHORT_TEMPLATE: &str = "\
{DEFAULT @cdm_schema = cdm}
{DEFAULT @drop_first = 1}
{@drop_first}?{IF OBJECT_ID('cohort', 'U') IS NOT NULL DROP TABLE cohort;}
SELECT person_id, ISNULL(gender, 'unknown') AS gender, GETDATE() AS run_date INTO cohort FROM @cdm_schema.person;
";

#[test]
fn test_render_template() {
    let sql = render(COHORT_TEMPLATE, &params(&[("cdm_schema", "synpuf")]));
    assert_eq!(
        sql,
        "IF OBJECT_ID('cohort', 'U') IS NOT NULL DROP TABLE cohort;\n\
         SELECT person_id, ISNULL(gender, 'unknown') AS gender, GETDATE() AS run_date INTO cohort FROM synpuf.person;\n"
    );
}

#[test]
fn test_render_without_drop() {
    let sql = render(COHORT_TEMPLATE, &params(&[("drop_first", "false")]));
    assert!(sql.starts_with("\nSELECT person_id"));
    assert!(sql.contains("FROM cdm.person;"));
}

#[test]
fn test_render_translate_split_postgresql() {
    let table = fixture_table();
    let rendered = render(COHORT_TEMPLATE, &params(&[]));
    let translated =
        translate_to_dialect(&rendered, "postgresql", &table, &options(None)).unwrap();
    let statements = split(&translated);
    assert_eq!(
        statements,
        vec![
            "DROP TABLE IF EXISTS cohort;",
            "CREATE TABLE cohort  AS\n\
             SELECT person_id, COALESCE(gender,'unknown') AS gender, CURRENT_DATE AS run_date  FROM cdm.person;",
        ]
    );
}

#[test]
fn test_oracle_block_survives_split() {
    let table = fixture_table();
    let rendered = render(COHORT_TEMPLATE, &params(&[]));
    let translated = translate_to_dialect(&rendered, "oracle", &table, &options(None)).unwrap();
    let statements = split(&translated);
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[0],
        "BEGIN\n  EXECUTE IMMEDIATE 'TRUNCATE TABLE cohort';\n  EXECUTE IMMEDIATE 'DROP TABLE cohort';\n\
         EXCEPTION\n  WHEN OTHERS THEN\n    IF SQLCODE != -942 THEN\n      RAISE;\n    END IF;\nEND;"
    );
    assert!(statements[1].contains("SYSDATE AS run_date"));
}

#[test]
fn test_oracle_temp_tables() {
    let table = fixture_table();
    let translated = translate_to_dialect(
        "SELECT * INTO #codes FROM concept; DROP TABLE #codes;",
        "oracle",
        &table,
        &options(Some("scratch")),
    )
    .unwrap();
    assert_eq!(
        translated,
        format!(
            "SELECT * INTO scratch.{id}codes FROM concept; DROP TABLE scratch.{id}codes;",
            id = SESSION_ID
        )
    );
}

#[test]
fn test_source_dialect_is_passthrough() {
    let table = fixture_table();
    let sql = "SELECT GETDATE();";
    assert_eq!(
        translate_to_dialect(sql, "sql server", &table, &TranslateOptions::default()).unwrap(),
        sql
    );
}

#[test]
fn test_unknown_dialect() {
    let table = fixture_table();
    let err = translate_to_dialect("SELECT 1;", "dbase", &table, &TranslateOptions::default())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Don't know how to translate to 'dbase'. Valid target dialects are sql server, bigquery, oracle, postgresql"
    );
}

#[test]
fn test_rendered_sql_identifier_check() {
    let sql = render(
        "CREATE TABLE #@name (x INT);",
        &params(&[("name", "intermediate_cohort_results")]),
    );
    assert_eq!(check_identifiers(&sql).len(), 1);
}

#[test]
fn test_render_translate_bigquery() {
    let table = fixture_table();
    let rendered = render(
        "SELECT gender, ISNULL(city, 'none') AS city, COUNT(*) AS n\n\
         FROM @cdm_schema.person\n\
         GROUP BY gender, ISNULL(city, 'none')\n\
         ORDER BY COUNT(*) DESC;",
        &params(&[("cdm_schema", "synpuf")]),
    );
    let translated = translate_to_dialect(&rendered, "bigquery", &table, &options(None)).unwrap();
    assert_eq!(
        translated,
        "select gender, IFNULL(city,'none') as city, count(*) as n from synpuf.person\n\
         group by 1, 2 order by 3 desc;"
    );
}
