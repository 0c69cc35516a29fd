//! SQL tokenizer shared by the pattern translator and the statement splitter
//!
//! Tokens are runs of identifier characters (letters, digits, `_` and `@`)
//! or single non-whitespace characters. Whitespace, `--` line comments and
//! `/* */` block comments separate tokens and are never returned. Quote
//! characters are returned as their own tokens, and every token between an
//! opening and a closing quote is flagged `in_quotes`, so callers can track
//! literals without losing the words inside them.

use crate::error::{Result, SqlRenderError};
use crate::util::starts_with_ci;

/// A lexical unit with its byte offsets in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset just past the last character
    pub end: usize,
    /// Exact source text (case preserved)
    pub text: &'a str,
    /// Whether the token lies inside a quoted literal
    pub in_quotes: bool,
}

impl Token<'_> {
    /// Case-insensitive comparison against `text`.
    #[inline]
    pub fn is(&self, text: &str) -> bool {
        self.text.eq_ignore_ascii_case(text)
    }

    /// Whether this token is a single or double quote character.
    #[inline]
    pub fn is_quote(&self) -> bool {
        self.text == "'" || self.text == "\""
    }

    /// Whether the token is a bare identifier: letters, digits and `_` only.
    #[inline]
    pub fn is_identifier(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(|c| c.is_alphanumeric() || c == '_')
    }
}

#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '@'
}

/// Lazy tokenizer over a SQL string.
///
/// Strict tokenizers (see [`Tokenizer::new`]) yield a final
/// [`SqlRenderError::UnterminatedLiteral`] when input ends inside a quoted
/// literal; lenient ones (see [`Tokenizer::lenient`]) just stop.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
    /// Open quote character and its offset
    quote: Option<(char, usize)>,
    strict: bool,
    done: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            quote: None,
            strict: true,
            done: false,
        }
    }

    pub fn lenient(text: &'a str) -> Self {
        Self {
            strict: false,
            ..Self::new(text)
        }
    }

    fn token(&self, start: usize, end: usize) -> Token<'a> {
        Token {
            start,
            end,
            text: &self.text[start..end],
            in_quotes: self.quote.is_some(),
        }
    }

    /// Skips a comment starting at the cursor. Returns false if there is none.
    fn skip_comment(&mut self, rest: &str) -> bool {
        if rest.starts_with("--") && !starts_with_ci(&rest[2..], "hint") {
            self.pos += rest.find('\n').map_or(rest.len(), |i| i + 1);
            true
        } else if let Some(body) = rest.strip_prefix("/*") {
            self.pos += body.find("*/").map_or(rest.len(), |i| i + 4);
            true
        } else {
            false
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let rest = &self.text[self.pos..];
            let Some(ch) = rest.chars().next() else {
                self.done = true;
                return match self.quote {
                    Some((quote, offset)) if self.strict => {
                        Some(Err(SqlRenderError::UnterminatedLiteral { quote, offset }))
                    }
                    _ => None,
                };
            };

            if is_word_char(ch) {
                let len = rest.find(|c| !is_word_char(c)).unwrap_or(rest.len());
                let token = self.token(self.pos, self.pos + len);
                self.pos += len;
                return Some(Ok(token));
            }

            if self.quote.is_none() && self.skip_comment(rest) {
                continue;
            }

            let width = ch.len_utf8();
            if ch.is_whitespace() {
                self.pos += width;
                continue;
            }

            let token = self.token(self.pos, self.pos + width);
            match self.quote {
                None if ch == '\'' || ch == '"' => self.quote = Some((ch, self.pos)),
                Some((quote, _)) if ch == quote => self.quote = None,
                _ => {}
            }
            self.pos += width;
            return Some(Ok(token));
        }
    }
}

/// Tokenize `text`, failing on an unterminated quoted literal.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>> {
    Tokenizer::new(text).collect()
}

/// Tokenize `text`, tolerating an unterminated quoted literal.
pub fn tokenize_lenient(text: &str) -> Vec<Token<'_>> {
    Tokenizer::lenient(text).filter_map(Result::ok).collect()
}
