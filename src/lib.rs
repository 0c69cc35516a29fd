//! sql-render: parameterized SQL templates, dialect translation and
//! statement splitting
//!
//! The crate has three independent engines:
//!
//! - [`render`] expands `@name` parameters, `{DEFAULT @name = value}`
//!   declarations and `{condition}?{then}:{else}` branches in a template;
//! - [`translate`] rewrites SQL with ordered search/replace rules whose
//!   patterns capture token runs with `@name` placeholders, plus structural
//!   rewrites for BigQuery;
//! - [`split`] breaks a script into statements on top-level `;`.
//!
//! All of them are pure functions of their inputs. Diagnostics go through
//! `tracing`; no subscriber is installed here.

pub mod error;
pub mod parser;
pub mod render;
pub mod split;
pub mod translate;
pub mod util;

pub use error::{Result, SqlRenderError};
pub use render::{check_parameters, render, render_with, ConditionGrammar, RenderOptions};
pub use split::{split, split_with, SplitOptions, TerminatorPolicy};
pub use translate::{
    check_identifiers, generate_session_id, translate, translate_bigquery, translate_to_dialect,
    translate_with, validate_session_id, ReplacementRule, ReplacementTable, TranslateOptions,
};
