//! Template rendering
//!
//! Rendering runs three passes over the template:
//!
//! 1. `{DEFAULT @name = value}` declarations are stripped and merged into the
//!    parameters (caller-supplied values win).
//! 2. Every `@name` with a value is substituted.
//! 3. `{condition}?{then}:{else}` branches are resolved.
//!
//! Rendering never fails: unmatched braces stay literal text and unknown
//! `@name` references pass through unchanged.

pub mod condition;
pub mod conditional;
pub mod defaults;

use std::collections::HashMap;

use crate::util::substitute_parameters;

pub use condition::{evaluate, evaluate_with, ConditionGrammar};
pub use conditional::{link_branches, resolve_conditionals, ConditionalBranch};
pub use defaults::extract_defaults;

/// Options for rendering a template
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Grammar used for `{condition}` evaluation
    pub grammar: ConditionGrammar,
}

/// Render `template` with `parameters` (names without the `@` prefix).
pub fn render(template: &str, parameters: &HashMap<String, String>) -> String {
    render_with(template, parameters, &RenderOptions::default())
}

/// Render `template` with explicit options.
pub fn render_with(
    template: &str,
    parameters: &HashMap<String, String>,
    options: &RenderOptions,
) -> String {
    let (stripped, defaults) = extract_defaults(template);
    let merged = defaults::merge_defaults(parameters, defaults);
    let substituted = substitute_parameters(&stripped, &merged);
    resolve_conditionals(&substituted, options.grammar)
}

/// Warn about supplied parameters that the template never references.
pub fn check_parameters<'a, I>(template: &str, names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !template.contains(&format!("@{}", name)))
        .map(|name| format!("Parameter '{}' not found in SQL", name))
        .collect()
}
