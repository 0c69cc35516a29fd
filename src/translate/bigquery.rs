//! Rewrites BigQuery needs before its rule table runs
//!
//! BigQuery rejects a few constructs that the rule table cannot express as
//! single search/replace rules: complex GROUP BY / ORDER BY expressions
//! (they must refer to the select list by position), column lists on common
//! table expressions, and string concatenation with `+`. Quoted numeric
//! lists compared against `*_id` columns are also unquoted. The passes here
//! walk those constructs with the same pattern matcher the rules use.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::parser::{tokenize, tokenize_lenient, Token};

use super::pattern::{Block, CompiledPattern};
use super::search::{search, MatchedPattern};

/// Target dialect name that triggers these passes
pub const BIGQUERY_DIALECT: &str = "bigquery";

fn builtin(pattern: &str) -> CompiledPattern {
    CompiledPattern::compile(pattern).expect("Invalid built-in pattern")
}

static LIST_ELEMENT: Lazy<CompiledPattern> = Lazy::new(|| builtin(", @a ,"));
static LEADING_DISTINCT: Lazy<CompiledPattern> = Lazy::new(|| builtin("^ distinct @a $"));
static TRAILING_INTO: Lazy<CompiledPattern> = Lazy::new(|| builtin("^ @a into @b $"));
static TRAILING_ORDER_BY: Lazy<CompiledPattern> = Lazy::new(|| builtin("^ @a order by @b $"));
static ALIAS: Lazy<CompiledPattern> = Lazy::new(|| builtin("^ @a as @b $"));

static FIRST_CTE: Lazy<CompiledPattern> =
    Lazy::new(|| builtin("with @a (@b) as (select @c from @d)"));
static NEXT_CTE: Lazy<CompiledPattern> =
    Lazy::new(|| builtin(", @a (@b) as (select @c from @d)"));

static GROUP_BY: Lazy<CompiledPattern> =
    Lazy::new(|| builtin("select @s from @b group by @r;"));
static NESTED_GROUP_BY: Lazy<CompiledPattern> =
    Lazy::new(|| builtin("select @s from @b group by @r)"));
static ORDER_BY: Lazy<CompiledPattern> =
    Lazy::new(|| builtin("select @s from @b group by @c order by @r;"));

static SELECT_LIST: Lazy<CompiledPattern> = Lazy::new(|| builtin("select @a from"));
static CONCAT: Lazy<CompiledPattern> = Lazy::new(|| builtin("+ @a + @b +"));
static STRING_CONCAT: Lazy<Vec<CompiledPattern>> = Lazy::new(|| {
    [
        "^ '@a' +",
        "^ cast(@a as varchar) +",
        "^ isnull(@a, '@b') +",
        "^ case @a then '@b' @c end +",
        "^ @a + '@b'",
    ]
    .into_iter()
    .map(builtin)
    .collect()
});

static IN_LIST: Lazy<CompiledPattern> = Lazy::new(|| builtin("in (@i)"));

/// Applies the BigQuery rewrites to `sql`.
///
/// Everything outside string literals is lowercased first. Fails only when
/// `sql` contains an unterminated string literal.
pub fn translate_bigquery(sql: &str) -> Result<String> {
    let sql = lower_case(sql)?;
    let sql = alias_common_table_expressions(sql, &FIRST_CTE, "with ");
    let sql = alias_common_table_expressions(sql, &NEXT_CTE, ", ");
    let sql = convert_select_list_references(sql, &GROUP_BY, ListKind::GroupBy);
    let sql = convert_select_list_references(sql, &NESTED_GROUP_BY, ListKind::GroupBy);
    let sql = convert_select_list_references(sql, &ORDER_BY, ListKind::OrderBy);
    let sql = replace_string_concats(sql);
    Ok(unquote_id_in_lists(sql))
}

fn find(text: &str, pattern: &CompiledPattern, from: usize) -> Option<MatchedPattern> {
    let tokens = tokenize_lenient(text);
    search(text, &tokens, pattern, from)
}

/// Matches `pattern` against the whole of `text`, using `^` and `$` as
/// sentinels.
fn find_anchored(text: &str, pattern: &CompiledPattern) -> Option<MatchedPattern> {
    find(&format!("^{}$", text), pattern, 0)
}

/// Trimmed capture of placeholder `name`.
fn capture(found: &MatchedPattern, name: &str) -> String {
    found
        .bindings
        .get(name)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn same_tokens(left: &str, right: &str) -> bool {
    let left = tokenize_lenient(left);
    let right = tokenize_lenient(right);
    left.len() == right.len() && left.iter().zip(&right).all(|(l, r)| l.is(r.text))
}

fn lower_case(sql: &str) -> Result<String> {
    let tokens = tokenize(sql)?;
    let mut lowered = String::with_capacity(sql.len());
    let mut copied = 0;
    for token in tokens.iter().filter(|t| !t.in_quotes) {
        lowered.push_str(&sql[copied..token.start]);
        lowered.push_str(&token.text.to_lowercase());
        copied = token.end;
    }
    lowered.push_str(&sql[copied..]);
    Ok(lowered)
}

// ============================================================================
// Comma-separated lists
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Select,
    GroupBy,
    OrderBy,
    WithColumns,
    In,
}

/// One element of a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListElement {
    expression: String,
    /// Select list alias (without `AS`) or ORDER BY direction (with a leading
    /// space)
    suffix: String,
}

impl ListElement {
    fn new(text: String, kind: ListKind) -> Self {
        let (expression, suffix) = match kind {
            ListKind::Select => split_alias(&text),
            ListKind::OrderBy => split_direction(&text),
            ListKind::GroupBy | ListKind::WithColumns | ListKind::In => (text, String::new()),
        };
        Self { expression, suffix }
    }

    /// Whether the expression is a bare `table.column` reference.
    fn is_single_column_reference(&self) -> bool {
        match tokenize_lenient(&self.expression).as_slice() {
            [table, dot, column] => {
                table.is_identifier() && dot.text == "." && column.is_identifier()
            }
            _ => false,
        }
    }
}

fn split_alias(text: &str) -> (String, String) {
    if let Some(found) = find_anchored(text, &ALIAS) {
        return (capture(&found, "a"), capture(&found, "b"));
    }
    // Without AS, a trailing identifier after anything but `.` or `+` is
    // taken as the alias.
    let tokens = tokenize_lenient(text);
    if let [.., before, last] = tokens.as_slice() {
        if is_implicit_alias(before, last) {
            return (text[..last.start].trim_end().to_string(), last.text.to_string());
        }
    }
    (text.to_string(), String::new())
}

fn is_implicit_alias(before: &Token<'_>, last: &Token<'_>) -> bool {
    last.is_identifier()
        && !last.text.starts_with(|c: char| c.is_ascii_digit())
        && !last.is("end")
        && before.text != "."
        && before.text != "+"
}

fn split_direction(text: &str) -> (String, String) {
    match tokenize_lenient(text).last() {
        Some(last) if last.is("asc") || last.is("desc") => (
            text[..last.start].trim_end().to_string(),
            format!(" {}", last.text),
        ),
        _ => (text.to_string(), String::new()),
    }
}

/// A comma-separated list with the clauses that bracket it.
#[derive(Debug, Clone, Default)]
struct CommaList {
    /// `distinct ` in front of a select list
    prefix: String,
    /// ` into ...` after a select list, or ` order by ...` after a GROUP BY
    suffix: String,
    elements: Vec<ListElement>,
}

impl CommaList {
    fn parse(list: &str, kind: ListKind) -> Self {
        let mut parsed = Self::default();
        let mut body = list.to_string();
        match kind {
            ListKind::Select => {
                if let Some(found) = find_anchored(&body, &LEADING_DISTINCT) {
                    parsed.prefix = "distinct ".to_string();
                    body = capture(&found, "a");
                }
                if let Some(found) = find_anchored(&body, &TRAILING_INTO) {
                    parsed.suffix = format!(" into {}", capture(&found, "b"));
                    body = capture(&found, "a");
                }
            }
            ListKind::GroupBy => {
                if let Some(found) = find_anchored(&body, &TRAILING_ORDER_BY) {
                    parsed.suffix = format!(" order by {}", capture(&found, "b"));
                    body = capture(&found, "a");
                }
            }
            ListKind::OrderBy | ListKind::WithColumns | ListKind::In => {}
        }

        let wrapped = format!(",{},", body);
        let tokens = tokenize_lenient(&wrapped);
        let mut from = 0;
        while let Some(found) = search(&wrapped, &tokens, &LIST_ELEMENT, from) {
            parsed.elements.push(ListElement::new(capture(&found, "a"), kind));
            // The closing comma opens the next element.
            from = tokens
                .iter()
                .position(|t| t.end == found.end)
                .unwrap_or(tokens.len());
        }
        parsed
    }
}

// ============================================================================
// Passes
// ============================================================================

/// Moves CTE column lists onto the CTE's select list as aliases:
/// `with c (x) as (select a from t)` becomes `with c as (select a as x from t)`.
fn alias_common_table_expressions(
    mut sql: String,
    pattern: &CompiledPattern,
    lead: &str,
) -> String {
    let mut from = 0;
    while let Some(found) = find(&sql, pattern, from) {
        let columns = CommaList::parse(&capture(&found, "b"), ListKind::WithColumns);
        let select = CommaList::parse(&capture(&found, "c"), ListKind::Select);
        let aliased = select
            .elements
            .iter()
            .zip(&columns.elements)
            .map(|(element, column)| format!("{} as {}", element.expression, column.expression))
            .collect::<Vec<_>>()
            .join(", ");
        let replacement = format!(
            "{}{} as (select {}{}{} from {})",
            lead,
            capture(&found, "a"),
            select.prefix,
            aliased,
            select.suffix,
            capture(&found, "d")
        );
        sql.replace_range(found.start..found.end, &replacement);
        from = found.start_token + 1;
    }
    sql
}

/// Position in `select` that a GROUP BY / ORDER BY element refers to, or the
/// element itself when it is a plain column reference or matches nothing.
fn select_reference(element: &ListElement, select: &CommaList) -> String {
    if element.is_single_column_reference() {
        return element.expression.clone();
    }
    let exact = select
        .elements
        .iter()
        .position(|candidate| same_tokens(&candidate.expression, &element.expression));
    let position = exact.or_else(|| {
        let pattern = CompiledPattern::compile(&element.expression).ok()?;
        select
            .elements
            .iter()
            .position(|candidate| find(&candidate.expression, &pattern, 0).is_some())
    });
    match position {
        Some(index) => (index + 1).to_string(),
        None => element.expression.clone(),
    }
}

/// Replaces complex GROUP BY or ORDER BY elements (placeholder `@r` of
/// `pattern`) with positional references into the select list (`@s`).
fn convert_select_list_references(
    sql: String,
    pattern: &CompiledPattern,
    kind: ListKind,
) -> String {
    let last_literal_len = match pattern.blocks().last() {
        Some(Block::Literal(text)) => text.len(),
        _ => return sql,
    };
    // A terminator for statements that lack one; removed again below.
    let mut sql = sql + ";";
    let mut from = 0;
    while let Some(found) = find(&sql, pattern, from) {
        from = found.start_token + 1;
        let Some(raw_list) = found.bindings.get("r") else {
            continue;
        };
        let select = CommaList::parse(&capture(&found, "s"), ListKind::Select);
        let list = CommaList::parse(raw_list, kind);
        let converted = list
            .elements
            .iter()
            .map(|element| format!("{}{}", select_reference(element, &select), element.suffix))
            .collect::<Vec<_>>()
            .join(", ");
        let replacement = format!("{}{}{}", list.prefix, converted, list.suffix);

        // `@r` runs up to the final literal; its trailing whitespace stays.
        let list_end = found.end - last_literal_len;
        let list_start = list_end - raw_list.len();
        let kept_end = list_start + raw_list.trim_end().len();
        sql.replace_range(list_start..kept_end, &replacement);
    }
    sql.pop();
    sql
}

fn is_string_concat(expression: &str) -> bool {
    let anchored = format!("^{}", expression);
    STRING_CONCAT
        .iter()
        .any(|pattern| find(&anchored, pattern, 0).is_some())
}

/// Rewrites `a + b + c` as `concat(concat(a, b), c)`.
fn concat_expression(expression: &str) -> String {
    let mut wrapped = format!("+{}+", expression);
    while let Some(found) = find(&wrapped, &CONCAT, 0) {
        let replacement = format!(
            "+concat({}, {})+",
            capture(&found, "a"),
            capture(&found, "b")
        );
        wrapped.replace_range(found.start..found.end, &replacement);
    }
    wrapped[1..wrapped.len() - 1].to_string()
}

/// Converts string concatenation with `+` in select lists to `concat()`.
fn replace_string_concats(mut sql: String) -> String {
    let mut from = 0;
    while let Some(found) = find(&sql, &SELECT_LIST, from) {
        from = found.start_token + 1;
        let select = CommaList::parse(&capture(&found, "a"), ListKind::Select);
        let items = select
            .elements
            .iter()
            .map(|element| {
                let expression = if is_string_concat(&element.expression) {
                    concat_expression(&element.expression)
                } else {
                    element.expression.clone()
                };
                if element.suffix.is_empty() {
                    expression
                } else {
                    format!("{} as {}", expression, element.suffix)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let replacement = format!("select {}{}{} from", select.prefix, items, select.suffix);
        sql.replace_range(found.start..found.end, &replacement);
    }
    sql
}

fn is_quoted_number(text: &str) -> bool {
    text.len() > 2
        && text.starts_with('\'')
        && text.ends_with('\'')
        && text[1..text.len() - 1].chars().all(|c| c.is_ascii_digit())
}

/// Unquotes `*_id in ('1', '2')` lists whose elements are all quoted
/// numbers.
fn unquote_id_in_lists(mut sql: String) -> String {
    let mut from = 0;
    while let Some(found) = find(&sql, &IN_LIST, from) {
        from = found.start_token + 1;
        let tokens = tokenize_lenient(&sql);
        let is_id_column = found
            .start_token
            .checked_sub(1)
            .and_then(|i| tokens.get(i))
            .is_some_and(|t| t.is_identifier() && t.text.to_lowercase().ends_with("_id"));
        if !is_id_column {
            continue;
        }
        let list = capture(&found, "i");
        let all_numbers = CommaList::parse(&list, ListKind::In)
            .elements
            .iter()
            .all(|element| is_quoted_number(&element.expression));
        if all_numbers {
            let replacement = format!("in ({})", list.replace('\'', ""));
            sql.replace_range(found.start..found.end, &replacement);
        }
    }
    sql
}
