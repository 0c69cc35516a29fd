//! Base token parser providing cursor navigation over a token stream.
//!
//! `TokenParser` owns the tokens of one SQL string together with a position
//! and offers the lookahead and case-insensitive checks the statement
//! splitter needs.
//!
//! ```ignore
//! let mut parser = TokenParser::new("BEGIN x; END;");
//! while let Some(token) = parser.current_token() {
//!     if parser.check_word_ci("end") && !parser.peek_word_ci(1, "if") {
//!         // ...
//!     }
//!     parser.advance();
//! }
//! ```

use super::tokenizer::{tokenize_lenient, Token};

/// Base token parser with common helper methods.
pub struct TokenParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TokenParser<'a> {
    /// Create a new TokenParser from a SQL string.
    ///
    /// Tokenization is lenient: an unterminated literal simply swallows the
    /// rest of the input.
    pub fn new(sql: &'a str) -> Self {
        Self {
            tokens: tokenize_lenient(sql),
            pos: 0,
        }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    /// Check if at end of tokens.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Get the underlying tokens slice.
    #[inline]
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    // ========================================================================
    // Token access
    // ========================================================================

    /// Get current token without consuming.
    #[inline]
    pub fn current_token(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    /// Peek at a token at an offset from current position.
    #[inline]
    pub fn peek(&self, offset: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + offset)
    }

    /// Token immediately before the current one.
    #[inline]
    pub fn previous(&self) -> Option<&Token<'a>> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Advance to next token.
    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    // ========================================================================
    // Token checks
    // ========================================================================

    /// Check if current token matches `word` (case-insensitive).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        self.peek_word_ci(0, word)
    }

    /// Check if the token at `offset` from the current one matches `word`.
    #[inline]
    pub fn peek_word_ci(&self, offset: usize, word: &str) -> bool {
        self.peek(offset).is_some_and(|token| token.is(word))
    }
}
