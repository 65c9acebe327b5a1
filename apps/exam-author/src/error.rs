//! Application-level errors for the CLI commands.

use exam_author_core::SubmitError;
use thiserror::Error;

/// Errors surfaced by the `exam-author` commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading a document or talking to the terminal failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be parsed or a report could not be written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The input is well-formed but not usable, e.g. a step out of range.
    #[error("Invalid input: {0}")]
    Invalid(String),
}
