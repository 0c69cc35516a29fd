//! Shared utility helpers.

use std::collections::HashMap;

/// Case-insensitive starts_with check without allocating.
#[inline]
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    haystack.len() >= needle.len()
        && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
#[inline]
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle_bytes = needle.as_bytes();
    let haystack_bytes = haystack.as_bytes();
    if needle_bytes.is_empty() || needle_bytes.len() > haystack_bytes.len() {
        return None;
    }
    haystack_bytes
        .windows(needle_bytes.len())
        .position(|window| window.eq_ignore_ascii_case(needle_bytes))
}

/// Removes one pair of matching single or double quotes surrounding `s`.
///
/// ```ignore
/// assert_eq!(strip_quotes("'abc'"), "abc");
/// assert_eq!(strip_quotes("\"abc\""), "abc");
/// assert_eq!(strip_quotes("'abc\""), "'abc\"");
/// ```
pub fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() > 1
        && ((bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Replaces every `@name` reference in `text` with its value.
///
/// The text is scanned once from left to right. At each `@` the longest
/// supplied name that follows is substituted, so `@ab` is never corrupted by
/// a shorter `@a`, and inserted values are never scanned again. References
/// without a value are left untouched. Matching is plain substring matching:
/// `@ab` with only `a` supplied becomes `<value of a>b`.
pub fn substitute_parameters(text: &str, values: &HashMap<String, String>) -> String {
    let mut names: Vec<&str> = values
        .keys()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return text.to_string();
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('@') {
        result.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        match names.iter().find(|name| after.starts_with(**name)) {
            Some(name) => {
                result.push_str(&values[*name]);
                rest = &after[name.len()..];
            }
            None => {
                result.push('@');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}
