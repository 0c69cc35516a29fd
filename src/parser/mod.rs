//! Text primitives shared by the renderer, translator and splitter

pub mod spans;
mod token_parser_base;
pub mod tokenizer;

pub(crate) use token_parser_base::TokenParser;
pub use spans::{find_spans, Span, SpanId, SpanSet};
pub use tokenizer::{tokenize, tokenize_lenient, Token, Tokenizer};
