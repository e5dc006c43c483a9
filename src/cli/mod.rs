//! CLI support for elx-lang
//!
//! Provides programmatic access to the `elx` commands for embedding in other
//! tools.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, parse_var};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    #[error("parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A `--var` argument without `=`
    #[error("invalid variable binding '{0}', expected name=value")]
    InvalidVar(String),

    #[error("unknown category: '{0}'\nRun 'elx docs' to see available categories.")]
    UnknownCategory(String),
}
