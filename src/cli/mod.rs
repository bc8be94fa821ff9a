//! CLI support for parsley
//!
//! Programmatic access to the `parsley` commands, so other tools can
//! embed them without shelling out.

mod check;
mod eval;
mod tokens;

pub use check::{CheckReport, execute_check};
pub use eval::{EvalOptions, EvalOutput, execute_eval};
pub use tokens::{TokenInfo, execute_tokens};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Expression failed to lex, parse or compile
    #[error("{0}")]
    Compile(#[from] crate::Error),

    /// Expression failed while evaluating
    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    /// Context or locals were not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
