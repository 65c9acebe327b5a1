//! # Errors
//!
//! Field-level validation errors and the submit error taxonomy.
//!
//! Field errors are values, never panics: they are written into the error map
//! and rendered inline next to the control they belong to. Only `submit` can
//! return an error to its caller.

use crate::primitives::{OPTIONS_PER_QUESTION, TOTAL_QUESTIONS};
use crate::state::ErrorKey;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

// =============================================================================
// FIELD ERRORS
// =============================================================================

/// A field validation failure. The `Display` text is the message shown to
/// the author.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Subject name is required")]
    SubjectRequired,

    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Duplicate question not allowed")]
    DuplicateQuestion,

    #[error("{n} options are required for each question", n = OPTIONS_PER_QUESTION)]
    MissingOptions,

    /// Raised while typing into a single option input.
    #[error("Option can not be empty")]
    EmptyOption,

    #[error("Same option not allowed")]
    DuplicateOption,

    #[error("Answer is required")]
    AnswerRequired,

    #[error("Notes are required")]
    NotesRequired,

    #[error("Notes can not be same")]
    DuplicateNotes,

    /// Submit attempted before every step passed validation.
    #[error("All {total} questions are required")]
    Incomplete { total: usize },

    /// Message produced by a custom [`FieldValidator`](crate::validation::FieldValidator).
    #[error("{0}")]
    Custom(String),
}

impl FieldError {
    /// The completion-gating error for the configured exam size.
    #[must_use]
    pub fn incomplete() -> Self {
        Self::Incomplete {
            total: TOTAL_QUESTIONS,
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// VALIDATION REPORT
// =============================================================================

/// Every error found by a submit preflight, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<(ErrorKey, FieldError)>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: ErrorKey, error: FieldError) {
        self.errors.push((key, error));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Look up the error recorded for a key.
    #[must_use]
    pub fn get(&self, key: ErrorKey) -> Option<&FieldError> {
        self.errors
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, error)| error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ErrorKey, FieldError)> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, error) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", key, error)?;
            first = false;
        }
        Ok(())
    }
}

// =============================================================================
// SUBMIT ERRORS
// =============================================================================

/// Why a submit did not complete.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Validation refused the submit; no collaborator call was made.
    #[error("Exam is not ready to submit ({count} error(s)): {0}", count = .0.len())]
    Invalid(ValidationReport),

    /// A submission is already in flight.
    #[error("A submission is already in progress")]
    AlreadySubmitting,

    /// The create/update collaborator failed.
    #[error("Submit failed: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

// =============================================================================
// TESTS
// =============================================================================
