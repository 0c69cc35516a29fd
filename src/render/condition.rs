//! Boolean conditions of `{condition}?{then}:{else}` templates
//!
//! Conditions are evaluated textually. The extended grammar resolves
//! parenthesized groups innermost-first, then treats the flattened text as
//! either a conjunction (if it contains `&`), a disjunction (if it contains
//! `|`), or a single primitive. `&` is looked for before `|`, so mixed
//! operators at one level must be parenthesized.

use crate::parser::find_spans;
use crate::util::{find_ci, strip_quotes};

/// Condition grammar used when resolving conditional branches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionGrammar {
    /// `false`/`0`, `==` and `!=` only
    Legacy,
    /// Groups, `&`, `|`, `in (...)` and the primitive forms
    #[default]
    Extended,
}

/// Evaluate `text` with the extended grammar.
pub fn evaluate(text: &str) -> bool {
    evaluate_with(text, ConditionGrammar::Extended)
}

/// Evaluate `text` with the given grammar.
pub fn evaluate_with(text: &str, grammar: ConditionGrammar) -> bool {
    match grammar {
        ConditionGrammar::Legacy => evaluate_legacy(text),
        ConditionGrammar::Extended => evaluate_extended(text),
    }
}

fn evaluate_legacy(text: &str) -> bool {
    let text = text.trim();
    if text.eq_ignore_ascii_case("false") || text == "0" {
        return false;
    }
    if let Some(equal) = compare(text, "==") {
        return equal;
    }
    if let Some(equal) = compare(text, "!=") {
        return !equal;
    }
    true
}

fn evaluate_extended(text: &str) -> bool {
    let mut text = text.trim().to_string();
    let mut groups = find_spans(&text, '(', ')');
    for id in groups.ids() {
        let group = groups[id];
        if !group.valid || preceded_by_in(&text, group.start) {
            continue;
        }
        let value = evaluate_boolean(&text[group.inner()]);
        text.replace_range(group.start..group.start + 1, if value { "1" } else { "0" });
        text = groups.rewrite(&text, group.start..group.end, group.start..group.start + 1);
    }
    evaluate_boolean(&text)
}

fn evaluate_boolean(text: &str) -> bool {
    let text = text.trim();
    let operands = |separator: char| {
        text.split(separator)
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
    };
    if text.contains('&') {
        operands('&').into_iter().all(evaluate_primitive)
    } else if text.contains('|') {
        operands('|').into_iter().any(evaluate_primitive)
    } else {
        evaluate_primitive(text)
    }
}

fn evaluate_primitive(text: &str) -> bool {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "false" | "0" | "!true" | "!1" => return false,
        "true" | "1" | "!false" | "!0" => return true,
        _ => {}
    }

    if let Some(equal) = compare(text, "==") {
        return equal;
    }
    if let Some(equal) = compare(text, "!=").or_else(|| compare(text, "<>")) {
        return !equal;
    }
    if let Some(found) = find_ci(text, " in ") {
        let left = strip_quotes(text[..found].trim());
        let right = text[found + 4..].trim();
        if right.len() > 2 && right.starts_with('(') && right.ends_with(')') {
            return right[1..right.len() - 1]
                .split(',')
                // Items are trimmed first, so `'b' in ('a', 'b')` holds.
                .any(|item| strip_quotes(item.trim()) == left);
        }
    }
    true
}

/// Compares the dequoted operands around `operator`, if present.
fn compare(text: &str, operator: &str) -> Option<bool> {
    let found = text.find(operator)?;
    let left = strip_quotes(text[..found].trim());
    let right = strip_quotes(text[found + operator.len()..].trim());
    Some(left == right)
}

/// Whether the `(` at `start` is preceded by the keyword `in`.
fn preceded_by_in(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end();
    match before.len().checked_sub(2) {
        Some(at) if before.is_char_boundary(at) => {
            before[at..].eq_ignore_ascii_case("in")
                && before[..at]
                    .chars()
                    .next_back()
                    .map_or(true, char::is_whitespace)
        }
        _ => false,
    }
}
