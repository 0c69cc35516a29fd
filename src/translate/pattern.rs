//! Search pattern compilation
//!
//! A pattern is a run of SQL tokens in which `@name` tokens are placeholders.
//! `@(regex)name` is a placeholder whose capture must match `regex`.

use regex::Regex;

use crate::error::{Result, SqlRenderError};
use crate::parser::{tokenize_lenient, Token};

/// Regex that a placeholder capture has to satisfy
#[derive(Debug, Clone)]
pub struct VariableConstraint {
    source: String,
    full: Regex,
    prefix: Regex,
}

impl VariableConstraint {
    fn new(pattern: &str, source: &str) -> Result<Self> {
        let build = |anchored: String| {
            Regex::new(&anchored).map_err(|source| SqlRenderError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })
        };
        Ok(Self {
            source: source.to_string(),
            full: build(format!("(?i)^(?:{})$", source))?,
            prefix: build(format!("(?i)^(?:{})", source))?,
        })
    }

    /// The regex as written in the pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether all of `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.full.is_match(text)
    }

    /// Length of the match anchored at the start of `text`, if any.
    pub fn match_prefix(&self, text: &str) -> Option<usize> {
        self.prefix.find(text).map(|m| m.end())
    }
}

/// One unit of a compiled pattern
#[derive(Debug, Clone)]
pub enum Block {
    /// Token matched case-insensitively (stored lowercased)
    Literal(String),
    /// Placeholder binding `@name`; the name is stored without the `@`
    Variable {
        name: String,
        constraint: Option<VariableConstraint>,
    },
}

impl Block {
    pub fn is_variable(&self) -> bool {
        matches!(self, Block::Variable { .. })
    }

    fn is_plain_variable(&self) -> bool {
        matches!(
            self,
            Block::Variable {
                constraint: None,
                ..
            }
        )
    }
}

/// A search pattern split into blocks
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    blocks: Vec<Block>,
}

impl CompiledPattern {
    /// Compiles `pattern`.
    ///
    /// Fails when the pattern is empty, starts or ends with a plain
    /// placeholder, has a plain placeholder directly before another
    /// placeholder, or has a malformed regex placeholder.
    pub fn compile(pattern: &str) -> Result<Self> {
        // ASCII lowercasing keeps byte offsets aligned with `pattern`.
        let lowered = pattern.to_ascii_lowercase();
        let tokens = tokenize_lenient(&lowered);
        if tokens.is_empty() {
            return Err(SqlRenderError::invalid_pattern(pattern, "pattern is empty"));
        }

        let mut blocks = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.text == "@" && tokens.get(i + 1).is_some_and(|t| t.text == "(") {
                let (block, next) = regex_variable(pattern, &tokens, i)?;
                blocks.push(block);
                i = next;
                continue;
            }
            let block = match token.text.strip_prefix('@') {
                Some(name) if !name.is_empty() => Block::Variable {
                    name: name.to_string(),
                    constraint: None,
                },
                _ => Block::Literal(token.text.to_string()),
            };
            blocks.push(block);
            i += 1;
        }

        let first_or_last_plain = blocks.first().is_some_and(Block::is_plain_variable)
            || blocks.last().is_some_and(Block::is_plain_variable);
        if first_or_last_plain {
            return Err(SqlRenderError::invalid_pattern(
                pattern,
                "pattern cannot start or end with a non-regex variable",
            ));
        }
        if blocks
            .windows(2)
            .any(|pair| pair[0].is_plain_variable() && pair[1].is_variable())
        {
            return Err(SqlRenderError::invalid_pattern(
                pattern,
                "a non-regex variable must be followed by a literal",
            ));
        }

        Ok(Self {
            source: pattern.to_string(),
            blocks,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// Parses `@(regex)name` starting at the `@` token `at`.
///
/// Returns the block and the index of the first token after the name.
fn regex_variable(pattern: &str, tokens: &[Token<'_>], at: usize) -> Result<(Block, usize)> {
    let open = &tokens[at + 1];
    let mut depth = 0usize;
    let mut escaped = false;
    for (j, token) in tokens.iter().enumerate().skip(at + 2) {
        match token.text {
            "\\" => {
                escaped = !escaped;
                continue;
            }
            "(" if !escaped => depth += 1,
            ")" if !escaped => {
                if depth == 0 {
                    let name = tokens
                        .get(j + 1)
                        .filter(|t| t.start == token.end && !t.text.starts_with('@'))
                        .filter(|t| t.text.chars().all(|c| c.is_alphanumeric() || c == '_'))
                        .ok_or_else(|| {
                            SqlRenderError::invalid_pattern(pattern, "regex variable has no name")
                        })?;
                    let constraint =
                        VariableConstraint::new(pattern, &pattern[open.end..token.start])?;
                    let block = Block::Variable {
                        name: name.text.to_string(),
                        constraint: Some(constraint),
                    };
                    return Ok((block, j + 2));
                }
                depth -= 1;
            }
            _ => {}
        }
        escaped = false;
    }
    Err(SqlRenderError::invalid_pattern(
        pattern,
        "unbalanced parentheses in regex variable",
    ))
}
