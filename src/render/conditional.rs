//! `{condition}?{then}:{else}` resolution over curly-brace spans

use crate::parser::{find_spans, SpanId, SpanSet};

use super::condition::{evaluate_with, ConditionGrammar};

/// A linked `{condition}?{then}` with an optional `:{else}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalBranch {
    pub condition: SpanId,
    pub if_true: SpanId,
    pub if_false: Option<SpanId>,
}

impl ConditionalBranch {
    /// Start of the whole branch region.
    pub fn start(&self, spans: &SpanSet) -> usize {
        spans[self.condition].start
    }

    /// End of the whole branch region.
    pub fn end(&self, spans: &SpanSet) -> usize {
        spans[self.if_false.unwrap_or(self.if_true)].end
    }

    fn is_valid(&self, spans: &SpanSet) -> bool {
        spans[self.condition].valid
            && spans[self.if_true].valid
            && self.if_false.map_or(true, |id| spans[id].valid)
    }
}

/// Whether the text strictly between spans `a` and `b` trims to `separator`.
fn separated_by(text: &str, spans: &SpanSet, a: SpanId, b: SpanId, separator: &str) -> bool {
    let (a, b) = (spans[a], spans[b]);
    b.start >= a.end && text[a.end..b.start].trim() == separator
}

/// Links spans into branches.
///
/// Earlier spans are tried as conditions against every later span; the first
/// later span separated by `?` becomes the "then" branch and the first span
/// after that separated by `:` becomes the "else" branch.
pub fn link_branches(text: &str, spans: &SpanSet) -> Vec<ConditionalBranch> {
    let ids: Vec<SpanId> = spans.ids().collect();
    let mut branches = Vec::new();
    for (i, &condition) in ids.iter().enumerate() {
        let Some((j, &if_true)) = ids
            .iter()
            .enumerate()
            .skip(i + 1)
            .find(|&(_, &candidate)| separated_by(text, spans, condition, candidate, "?"))
        else {
            continue;
        };
        let if_false = ids[j + 1..]
            .iter()
            .copied()
            .find(|&candidate| separated_by(text, spans, if_true, candidate, ":"));
        branches.push(ConditionalBranch {
            condition,
            if_true,
            if_false,
        });
    }
    branches
}

/// Working state for one resolution pass: the text being rewritten and the
/// spans tracked through every rewrite.
struct ConditionalResolver {
    text: String,
    spans: SpanSet,
}

impl ConditionalResolver {
    fn new(text: &str) -> Self {
        Self {
            spans: find_spans(text, '{', '}'),
            text: text.to_string(),
        }
    }

    fn resolve(mut self, grammar: ConditionGrammar) -> String {
        let branches = link_branches(&self.text, &self.spans);
        for branch in branches {
            if !branch.is_valid(&self.spans) {
                continue;
            }
            let region = branch.start(&self.spans)..branch.end(&self.spans);
            let condition = &self.text[self.spans[branch.condition].inner()];
            let satisfied = evaluate_with(condition, grammar);
            tracing::trace!("Condition '{}' evaluated to {}", condition.trim(), satisfied);

            let chosen = if satisfied {
                Some(branch.if_true)
            } else {
                branch.if_false
            };
            let source = match chosen {
                Some(id) => self.spans[id].inner(),
                None => region.start..region.start,
            };
            self.text = self.spans.rewrite(&self.text, region, source);
        }
        self.text
    }
}

/// Resolves every conditional branch in `text`.
pub fn resolve_conditionals(text: &str, grammar: ConditionGrammar) -> String {
    ConditionalResolver::new(text).resolve(grammar)
}
