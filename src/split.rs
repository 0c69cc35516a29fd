//! Statement splitting on `;` outside `BEGIN`/`CASE ... END` blocks

use crate::parser::TokenParser;

/// What happens to the `;` that ends a statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminatorPolicy {
    /// Every statement keeps its `;`
    #[default]
    Keep,
    /// Only a statement ending in an `END` that closed a `BEGIN` keeps its
    /// `;`; other statements lose it along with the whitespace before it
    BlockOnly,
}

/// Options for splitting
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    pub terminator: TerminatorPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Begin,
    Case,
}

/// Splits `sql` into statements, keeping each terminating `;`.
pub fn split(sql: &str) -> Vec<String> {
    split_with(sql, &SplitOptions::default())
}

/// Splits `sql` into statements.
///
/// Statements are slices of `sql` from their first token, so their case and
/// inner formatting are preserved. Quoted literals and `[...]` identifiers are
/// opaque. `END IF` does not close a block. An `END` without an open block is
/// ignored, and an unclosed block runs to the end of the input. Text after the
/// last `;` becomes the final statement.
pub fn split_with(sql: &str, options: &SplitOptions) -> Vec<String> {
    let mut parser = TokenParser::new(sql);
    let mut statements = Vec::new();
    let mut nest: Vec<BlockKind> = Vec::new();
    let mut last_pop: Option<BlockKind> = None;
    let mut in_bracket = false;
    let mut quote: Option<&str> = None;
    let mut start: Option<usize> = None;

    while let Some(&token) = parser.current_token() {
        let statement_start = *start.get_or_insert(token.start);

        // Brackets are checked before quotes so `[it's]` opens no literal.
        if in_bracket {
            in_bracket = token.text != "]";
        } else if let Some(open) = quote {
            if token.text == open {
                quote = None;
            }
        } else if token.is_quote() {
            quote = Some(token.text);
        } else if token.text == "[" {
            in_bracket = true;
        } else if token.is("begin") {
            nest.push(BlockKind::Begin);
        } else if token.is("case") {
            nest.push(BlockKind::Case);
        } else if parser.check_word_ci("end") && !parser.peek_word_ci(1, "if") {
            match nest.pop() {
                Some(kind) => last_pop = Some(kind),
                None => tracing::warn!("END at offset {} has no open BEGIN or CASE", token.start),
            }
        } else if nest.is_empty() && token.text == ";" {
            if statement_start < token.start {
                let keep = match options.terminator {
                    TerminatorPolicy::Keep => true,
                    TerminatorPolicy::BlockOnly => {
                        parser.previous().is_some_and(|t| t.is("end"))
                            && last_pop == Some(BlockKind::Begin)
                    }
                };
                let statement = if keep {
                    &sql[statement_start..token.end]
                } else {
                    sql[statement_start..token.start].trim_end()
                };
                statements.push(statement.to_string());
            }
            start = None;
        }
        parser.advance();
    }

    if let (Some(statement_start), Some(last)) = (start, parser.tokens().last()) {
        statements.push(sql[statement_start..last.end].to_string());
    }

    tracing::debug!("Split SQL into {} statement(s)", statements.len());
    statements
}
