//! `{DEFAULT @name = value}` declarations
//!
//! Declarations are removed from the template and their values are merged
//! into the caller's parameters, which always take precedence.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::strip_quotes;

/// Matches a declaration plus trailing blanks and one line break, so a line
/// holding only a declaration disappears entirely.
static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{DEFAULT ([^}]*)\}[ \t]*(?:\r?\n)?").expect("Invalid default regex")
});

/// Strips all default declarations from `template`.
///
/// Returns the remaining text and the declared defaults keyed by parameter
/// name without the `@` prefix. Later declarations of the same name win.
pub fn extract_defaults(template: &str) -> (String, HashMap<String, String>) {
    let mut defaults = HashMap::new();
    for caps in DEFAULT_RE.captures_iter(template) {
        let body = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        if let Some((name, value)) = parse_declaration(body) {
            tracing::trace!("Default value for @{}: {}", name, value);
            defaults.insert(name, value);
        }
    }
    let stripped = DEFAULT_RE.replace_all(template, "").into_owned();
    (stripped, defaults)
}

/// Parses `@name = value` into `(name, value)`.
fn parse_declaration(body: &str) -> Option<(String, String)> {
    let (name, value) = body.split_once('=')?;
    let name = name.trim();
    let name = name.strip_prefix('@').unwrap_or(name);
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), strip_quotes(value.trim()).to_string()))
}

/// Adds every default whose name the caller did not supply.
pub fn merge_defaults(
    parameters: &HashMap<String, String>,
    defaults: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = parameters.clone();
    for (name, value) in defaults {
        merged.entry(name).or_insert(value);
    }
    merged
}
