//! Warnings for identifiers that are too long for some target dialects

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::session::SESSION_ID_LENGTH;

/// Longest table name accepted by the most restrictive target dialect
pub const MAX_TABLE_NAME_LENGTH: usize = 30;

/// Temp tables get a session id and a separator appended.
const MAX_TEMP_NAME_LENGTH: usize = MAX_TABLE_NAME_LENGTH - SESSION_ID_LENGTH - 1;

static TEMP_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#[0-9a-zA-Z_]+").expect("Invalid temp table regex"));

static TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:create|drop|truncate)\s+table +([0-9a-zA-Z_]+)")
        .expect("Invalid table name regex")
});

/// Returns one warning per distinct temp table or table name that is too
/// long, temp tables first.
pub fn check_identifiers(sql: &str) -> Vec<String> {
    let long_temp_names: BTreeSet<&str> = TEMP_TABLE_RE
        .find_iter(sql)
        .map(|m| m.as_str())
        .filter(|name| name.len() > MAX_TEMP_NAME_LENGTH)
        .collect();
    let long_names: BTreeSet<&str> = TABLE_RE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| name.len() > MAX_TABLE_NAME_LENGTH)
        .collect();

    let temp_warnings = long_temp_names.into_iter().map(|name| {
        format!(
            "Temp table name '{}' is too long. Temp table names should be shorter than {} characters",
            name,
            MAX_TEMP_NAME_LENGTH + 1
        )
    });
    let table_warnings = long_names.into_iter().map(|name| {
        format!(
            "Table name '{}' is too long. Table names should be shorter than {} characters",
            name,
            MAX_TABLE_NAME_LENGTH + 1
        )
    });
    temp_warnings.chain(table_warnings).collect()
}
