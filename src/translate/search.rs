//! Token-level matching of a compiled pattern against SQL

use std::collections::HashMap;

use crate::parser::Token;

use super::pattern::{Block, CompiledPattern};

/// A successful match of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPattern {
    /// Byte offset where the match starts
    pub start: usize,
    /// Byte offset just past the match
    pub end: usize,
    /// Index of the first matched token
    pub start_token: usize,
    /// Captured text per placeholder name (without `@`)
    pub bindings: HashMap<String, String>,
}

/// Progress of one match attempt.
#[derive(Default)]
struct Attempt {
    /// Index of the block being satisfied
    block: usize,
    start: usize,
    start_token: usize,
    /// Where the current placeholder's capture begins
    var_start: usize,
    /// Open `(` and quote characters seen while capturing
    nest: Vec<char>,
    /// Inside a quote that the pattern itself opened
    in_pattern_quote: bool,
    bindings: HashMap<String, String>,
}

impl Attempt {
    fn is_started(&self) -> bool {
        self.block != 0
    }

    fn begin(&mut self, start: usize, start_token: usize) {
        self.start = start;
        self.start_token = start_token;
    }

    fn finish(self, end: usize) -> MatchedPattern {
        MatchedPattern {
            start: self.start,
            end,
            start_token: self.start_token,
            bindings: self.bindings,
        }
    }

    fn toggle_quote(&mut self, token: &Token<'_>) {
        if token.is_quote() {
            self.in_pattern_quote = !self.in_pattern_quote;
        }
    }

    /// Tracks brackets and quotes inside a capture.
    fn track_nesting(&mut self, token: &Token<'_>) {
        let Some(ch) = token.text.chars().next() else {
            return;
        };
        match self.nest.last() {
            Some(&quote) if quote == '\'' || quote == '"' => {
                if ch == quote && token.text.len() == 1 {
                    self.nest.pop();
                }
            }
            top => {
                if token.is_quote() {
                    self.nest.push(ch);
                } else if !self.in_pattern_quote && token.text == "(" {
                    self.nest.push('(');
                } else if !self.in_pattern_quote && token.text == ")" && top == Some(&'(') {
                    self.nest.pop();
                }
            }
        }
    }
}

/// The literal directly after block `index`, if any.
fn boundary_after(blocks: &[Block], index: usize) -> Option<&str> {
    match blocks.get(index + 1) {
        Some(Block::Literal(text)) => Some(text),
        _ => None,
    }
}

/// Start of the token after `cursor`, or the end of the text.
fn next_start(sql: &str, tokens: &[Token<'_>], cursor: usize) -> usize {
    tokens.get(cursor + 1).map_or(sql.len(), |t| t.start)
}

/// Finds the first match of `pattern` in `sql` at or after token `from`.
///
/// `tokens` must be the tokens of `sql`. Captures are sliced from `sql`, so
/// they keep their original case. A placeholder capture never crosses a `;`
/// or a `)` that closes a bracket opened before it, and the first literal
/// of a pattern never matches inside a quoted string.
pub fn search(
    sql: &str,
    tokens: &[Token<'_>],
    pattern: &CompiledPattern,
    from: usize,
) -> Option<MatchedPattern> {
    let blocks = pattern.blocks();
    let mut attempt = Attempt::default();
    let mut cursor = from;

    loop {
        let Some(token) = tokens.get(cursor) else {
            if attempt.is_started() {
                // Ran out of text mid-match; retry from the next start token.
                cursor = attempt.start_token + 1;
                attempt = Attempt::default();
                continue;
            }
            return None;
        };

        let mut reset = false;
        let boundary = boundary_after(blocks, attempt.block);
        match &blocks[attempt.block] {
            Block::Variable {
                name,
                constraint: Some(constraint),
            } if !attempt.is_started() || boundary.is_none() => {
                // No literal to stop at: take the longest regex match here.
                match constraint.match_prefix(&sql[token.start..]) {
                    Some(len) => {
                        let end = token.start + len;
                        if !attempt.is_started() {
                            attempt.begin(token.start, cursor);
                        }
                        attempt
                            .bindings
                            .insert(name.clone(), sql[token.start..end].to_string());
                        attempt.block += 1;
                        if attempt.block == blocks.len() {
                            return Some(attempt.finish(end));
                        }
                        attempt.var_start = end;
                        cursor += tokens[cursor..]
                            .iter()
                            .position(|t| t.start >= end)
                            .unwrap_or(tokens.len() - cursor);
                        continue;
                    }
                    None => reset = attempt.is_started(),
                }
            }
            Block::Variable { name, constraint } => {
                let Some(boundary) = boundary else {
                    return None;
                };
                if attempt.nest.is_empty() && token.is(boundary) {
                    let value = &sql[attempt.var_start.min(token.start)..token.start];
                    if constraint
                        .as_ref()
                        .is_some_and(|c| !c.is_match(value.trim_end()))
                    {
                        reset = true;
                    } else {
                        attempt.bindings.insert(name.clone(), value.to_string());
                        attempt.block += 2;
                        if attempt.block == blocks.len() {
                            return Some(attempt.finish(token.end));
                        }
                        if blocks[attempt.block].is_variable() {
                            attempt.var_start = next_start(sql, tokens, cursor);
                        }
                        attempt.toggle_quote(token);
                    }
                } else if attempt.nest.is_empty()
                    && !attempt.in_pattern_quote
                    && (token.text == ";" || token.text == ")")
                {
                    reset = true;
                } else {
                    attempt.track_nesting(token);
                }
            }
            Block::Literal(text) => {
                if token.is(text) && (attempt.is_started() || !token.in_quotes) {
                    if !attempt.is_started() {
                        attempt.begin(token.start, cursor);
                    }
                    attempt.block += 1;
                    if attempt.block == blocks.len() {
                        return Some(attempt.finish(token.end));
                    }
                    if blocks[attempt.block].is_variable() {
                        attempt.var_start = next_start(sql, tokens, cursor);
                    }
                    attempt.toggle_quote(token);
                } else if attempt.is_started() {
                    reset = true;
                }
            }
        }

        if reset {
            cursor = attempt.start_token + 1;
            attempt = Attempt::default();
        } else {
            cursor += 1;
        }
    }
}
