//! Pattern-based SQL translation
//!
//! Rules are applied in order. Each rule is searched and replaced until it
//! no longer matches before the next rule runs, so later rules see the
//! output of earlier ones.
//!
//! ```ignore
//! let rules = [ReplacementRule::new("ISNULL(@a,@b)", "COALESCE(@a,@b)")];
//! assert_eq!(translate("SELECT ISNULL(x, 0);", &rules)?, "SELECT COALESCE(x,0);");
//! ```

pub mod bigquery;
pub mod check;
pub mod pattern;
pub mod rules;
pub mod search;
pub mod session;

use crate::error::{Result, SqlRenderError};
use crate::parser::{tokenize, tokenize_lenient};
use crate::util::substitute_parameters;

pub use bigquery::{translate_bigquery, BIGQUERY_DIALECT};
pub use check::check_identifiers;
pub use pattern::{Block, CompiledPattern};
pub use rules::{ReplacementRule, ReplacementTable};
pub use search::{search, MatchedPattern};
pub use session::{generate_session_id, global_session_id, validate_session_id};

/// Dialect that rule tables translate from; translating to it is a no-op
pub const SOURCE_DIALECT: &str = "sql server";

/// Options for translation
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Replaces `%session_id%`; a per-process id is used when `None`
    pub session_id: Option<String>,
    /// Schema for emulated temp tables; `%temp_prefix%` becomes `"<schema>."`
    pub temp_schema: Option<String>,
}

/// Values substituted into replacement text before a rule is compiled.
struct Placeholders {
    session_id: String,
    temp_prefix: String,
}

impl TranslateOptions {
    fn placeholders(&self) -> Result<Placeholders> {
        let session_id = match &self.session_id {
            Some(id) => {
                validate_session_id(id)?;
                id.clone()
            }
            None => global_session_id().to_string(),
        };
        let temp_prefix = self
            .temp_schema
            .as_ref()
            .map(|schema| format!("{}.", schema))
            .unwrap_or_default();
        Ok(Placeholders {
            session_id,
            temp_prefix,
        })
    }
}

/// A rule ready to apply.
struct CompiledRule {
    pattern: CompiledPattern,
    replacement: String,
}

impl CompiledRule {
    fn compile(rule: &ReplacementRule, placeholders: &Placeholders) -> Result<Self> {
        let replacement = rule
            .replace
            .replace("%session_id%", &placeholders.session_id)
            .replace("%temp_prefix%", &placeholders.temp_prefix);
        Ok(Self {
            pattern: CompiledPattern::compile(&rule.search)?,
            replacement,
        })
    }

    /// Replaces every match in `sql`. Returns the new text and the number of
    /// replacements.
    fn apply(&self, mut sql: String) -> Result<(String, usize)> {
        // An empty replacement removes the match, so the next search has to
        // start at the same token.
        let step = usize::from(!tokenize_lenient(&self.replacement).is_empty());
        let mut from = 0;
        let mut count = 0;
        loop {
            let found = {
                let tokens = tokenize(&sql)?;
                search(&sql, &tokens, &self.pattern, from)
            };
            let Some(found) = found else {
                return Ok((sql, count));
            };
            let replacement = substitute_parameters(&self.replacement, &found.bindings);
            sql.replace_range(found.start..found.end, &replacement);
            from = found.start_token + step;
            count += 1;
        }
    }
}

/// Applies `rules` to `sql` with default options.
pub fn translate(sql: &str, rules: &[ReplacementRule]) -> Result<String> {
    translate_with(sql, rules, &TranslateOptions::default())
}

/// Applies `rules` to `sql`.
///
/// Fails on the first invalid pattern, or when `sql` contains an
/// unterminated string literal.
pub fn translate_with(
    sql: &str,
    rules: &[ReplacementRule],
    options: &TranslateOptions,
) -> Result<String> {
    let placeholders = options.placeholders()?;
    let mut sql = sql.to_string();
    for rule in rules {
        let compiled = CompiledRule::compile(rule, &placeholders)?;
        let (translated, count) = compiled.apply(sql)?;
        if count > 0 {
            tracing::debug!("Rule '{}' replaced {} match(es)", rule.search, count);
        }
        sql = translated;
    }
    Ok(sql)
}

/// Translates `sql` with the rules `table` holds for `dialect`.
///
/// For [`BIGQUERY_DIALECT`] the [`translate_bigquery`] rewrites run before
/// the rules.
pub fn translate_to_dialect(
    sql: &str,
    dialect: &str,
    table: &ReplacementTable,
    options: &TranslateOptions,
) -> Result<String> {
    match table.rules_for(dialect) {
        Some(rules) if dialect.eq_ignore_ascii_case(BIGQUERY_DIALECT) => {
            let rewritten = translate_bigquery(sql)?;
            tracing::debug!("Applied BigQuery rewrites before {} rule(s)", rules.len());
            translate_with(&rewritten, rules, options)
        }
        Some(rules) => translate_with(sql, rules, options),
        None if dialect == SOURCE_DIALECT => {
            options.placeholders()?;
            Ok(sql.to_string())
        }
        None => {
            let valid = std::iter::once(SOURCE_DIALECT)
                .chain(table.dialects().filter(|d| *d != SOURCE_DIALECT))
                .collect::<Vec<_>>()
                .join(", ");
            Err(SqlRenderError::UnknownDialect {
                dialect: dialect.to_string(),
                valid,
            })
        }
    }
}
