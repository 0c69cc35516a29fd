//! Balanced bracket spans and in-place rewriting with offset repair
//!
//! Spans live in a [`SpanSet`] and are addressed by [`SpanId`]. Every
//! [`SpanSet::rewrite`] splices the text and repairs the offsets of all other
//! spans, so several rewrites can be applied to one string without scanning
//! it again.

use std::ops::{Index, Range};

/// A balanced bracket region `[start, end)`, including both delimiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Cleared once a rewrite removed the span's opening delimiter
    pub valid: bool,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            valid: true,
        }
    }

    /// Byte range of the text between the delimiters.
    pub fn inner(&self) -> Range<usize> {
        self.start + 1..self.end - 1
    }
}

/// Handle to a span inside a [`SpanSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanId(usize);

/// Owned collection of spans, ordered by closing position
#[derive(Debug, Clone, Default)]
pub struct SpanSet {
    spans: Vec<Span>,
}

impl SpanSet {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, id: SpanId) -> Option<&Span> {
        self.spans.get(id.0)
    }

    /// Span handles in closing-position order.
    pub fn ids(&self) -> impl Iterator<Item = SpanId> {
        (0..self.spans.len()).map(SpanId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter()
    }

    /// Replaces `text[target]` with a copy of `text[source]` and repairs
    /// every valid span:
    ///
    /// - spans starting before the target are untouched, except that a span
    ///   enclosing the whole target has its end moved by the length change;
    /// - spans starting inside `source` move with the copied text;
    /// - spans starting at or after `target.end` shift by the length change;
    /// - any other span starting inside the target is invalidated.
    ///
    /// `source` is half-open and must lie within `target`; an empty source
    /// deletes the target.
    pub fn rewrite(&mut self, text: &str, target: Range<usize>, source: Range<usize>) -> String {
        let replacement = &text[source.clone()];
        let mut result = String::with_capacity(text.len() - target.len() + replacement.len());
        result.push_str(&text[..target.start]);
        result.push_str(replacement);
        result.push_str(&text[target.end..]);

        let removed = target.len() as isize;
        let length_delta = replacement.len() as isize - removed;
        for span in self.spans.iter_mut().filter(|span| span.valid) {
            if span.start >= target.start {
                if source.contains(&span.start) {
                    let delta = target.start as isize - source.start as isize;
                    span.start = shift(span.start, delta);
                    span.end = shift(span.end, delta);
                } else if span.start >= target.end {
                    span.start = shift(span.start, length_delta);
                    span.end = shift(span.end, length_delta);
                } else {
                    span.valid = false;
                }
            } else if span.end > target.end {
                span.end = shift(span.end, length_delta);
            }
        }
        result
    }
}

impl Index<SpanId> for SpanSet {
    type Output = Span;

    fn index(&self, id: SpanId) -> &Span {
        &self.spans[id.0]
    }
}

#[inline]
fn shift(offset: usize, delta: isize) -> usize {
    offset.saturating_add_signed(delta)
}

/// Finds balanced `open`/`close` spans in `text`.
///
/// Spans are returned in order of their closing delimiter, so nested spans
/// always come before the spans enclosing them. Unmatched delimiters produce
/// no span.
pub fn find_spans(text: &str, open: char, close: char) -> SpanSet {
    let mut starts = Vec::new();
    let mut spans = Vec::new();
    for (i, ch) in text.char_indices() {
        if ch == open {
            starts.push(i);
        } else if ch == close {
            if let Some(start) = starts.pop() {
                spans.push(Span::new(start, i + ch.len_utf8()));
            }
        }
    }
    SpanSet { spans }
}
