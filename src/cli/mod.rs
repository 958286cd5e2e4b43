//! CLI support for peek-query
//!
//! Provides programmatic access to the `peek` commands so they can be
//! embedded in other tools.

mod check;
mod docs;

pub use check::{CheckMode, CheckOptions, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Query error: {0}")]
    Path(#[from] crate::PathError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'peek docs' to see available categories.")]
    UnknownCategory(String),
}
