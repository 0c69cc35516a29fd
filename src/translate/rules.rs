//! Replacement rules and per-dialect rule tables

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SqlRenderError};

/// One search/replace directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRule {
    /// Search pattern with `@name` placeholders
    pub search: String,
    /// Replacement text; `@name` is replaced with the capture
    pub replace: String,
}

impl ReplacementRule {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }
}

impl<S: Into<String>, R: Into<String>> From<(S, R)> for ReplacementRule {
    fn from((search, replace): (S, R)) -> Self {
        Self::new(search, replace)
    }
}

/// Ordered rule lists keyed by target dialect.
///
/// ```ignore
/// let table = ReplacementTable::parse_csv(
///     "target,search,replace\npostgresql,ISNULL(@a,@b),COALESCE(@a,@b)\n",
/// )?;
/// assert_eq!(table.rules_for("postgresql").map(|r| r.len()), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    rules: BTreeMap<String, Vec<ReplacementRule>>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule` to the rules for `dialect`.
    pub fn add_rule(&mut self, dialect: impl Into<String>, rule: ReplacementRule) {
        self.rules.entry(dialect.into()).or_default().push(rule);
    }

    /// Rules for `dialect` in insertion order.
    pub fn rules_for(&self, dialect: &str) -> Option<&[ReplacementRule]> {
        self.rules.get(dialect).map(Vec::as_slice)
    }

    /// Dialects with at least one rule, sorted.
    pub fn dialects(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Reads and parses a rule table CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SqlRenderError::RuleTableReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse_csv(&content)
    }

    /// Parses a rule table from CSV text.
    ///
    /// The first line is a header and is skipped. Each following line holds
    /// `target_dialect,search,replace`; fields may be double-quoted and use
    /// `\"` and `\n` escapes. Blank lines are ignored and rows with an empty
    /// search pattern are skipped.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (index, line) in text.lines().enumerate().skip(1) {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let columns = split_columns(line);
            let [dialect, search, replace, ..] = columns.as_slice() else {
                return Err(SqlRenderError::MalformedRuleTable {
                    line: index + 1,
                    message: format!("expected 3 columns, found {}", columns.len()),
                });
            };
            if search.trim().is_empty() {
                tracing::warn!("Skipping rule table line {}: empty search pattern", index + 1);
                continue;
            }
            table.add_rule(
                dialect.clone(),
                ReplacementRule::new(search.clone(), replace.clone()),
            );
        }
        Ok(table)
    }
}

/// Splits a CSV line on commas outside double quotes and decodes each field.
fn split_columns(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut in_literal = false;
    let mut escaped = false;
    let mut field_start = 0;
    for (i, ch) in line.char_indices() {
        if ch == '"' && !escaped {
            in_literal = !in_literal;
        }
        if ch == ',' && !in_literal && !escaped {
            fields.push(decode_field(&line[field_start..i]));
            field_start = i + 1;
        }
        escaped = ch == '\\' && !escaped;
    }
    fields.push(decode_field(&line[field_start..]));
    fields
}

fn decode_field(field: &str) -> String {
    let field = match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
        Some(inner) => inner,
        None => field,
    };
    field.replace("\\\"", "\"").replace("\\n", "\n")
}
