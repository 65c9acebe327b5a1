//! # CLI Commands
//!
//! Implementations behind the `exam-author` subcommands. Each command takes
//! its output sink as a parameter so tests can capture it.

use crate::error::AppError;
use crate::session::{SessionEnd, run_session};
use exam_author_core::{
    ExamId, ExamPayload, ExamSubmitter, FieldErrors, FormStateStore, StepIndex, SubmitOutcome,
    TOTAL_QUESTIONS, TokenProvider, WizardController, WizardState, describe,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tokio::io::BufReader;
use tracing::{debug, info};

// =============================================================================
// EXAM DOCUMENT
// =============================================================================

/// An exam on disk: the payload, plus `examId` when it already exists on
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<ExamId>,
    #[serde(flatten)]
    pub payload: ExamPayload,
}

impl ExamDocument {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let doc: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), update = doc.exam_id.is_some(), "loaded exam document");
        Ok(doc)
    }

    /// Wizard state for this document. A document with an id is opened for
    /// editing; one without is a pre-filled create.
    pub fn into_state(self) -> WizardState {
        match self.exam_id {
            Some(id) => WizardState::for_existing(id, self.payload),
            None => WizardState::from_payload(self.payload),
        }
    }

    pub fn into_controller(self) -> WizardController {
        WizardController::from_store(FormStateStore::with_state(self.into_state()))
    }
}

/// Controller for `path` with every step validated.
fn checked_controller(path: &Path) -> Result<WizardController, AppError> {
    let mut ctrl = ExamDocument::load(path)?.into_controller();
    ctrl.validate_all_steps();
    Ok(ctrl)
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    valid: bool,
    completed_steps: usize,
    total_steps: usize,
    errors: &'a FieldErrors,
}

/// Validate a whole document. Returns whether it is ready to submit.
pub fn cmd_check(path: &Path, json: bool, out: &mut impl Write) -> Result<bool, AppError> {
    let mut ctrl = checked_controller(path)?;
    let valid = ctrl.preflight().is_ok();
    let state = ctrl.state();

    if json {
        let report = CheckReport {
            valid,
            completed_steps: state.completed_steps(),
            total_steps: TOTAL_QUESTIONS,
            errors: &state.field_errors,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else if valid {
        writeln!(out, "OK: {} is ready to submit", path.display())?;
    } else {
        writeln!(
            out,
            "{} problem(s) in {} ({}/{} steps complete):",
            state.field_errors.len(),
            path.display(),
            state.completed_steps(),
            TOTAL_QUESTIONS
        )?;
        for (key, error) in &state.field_errors {
            writeln!(out, "  {key}: {error}")?;
        }
    }

    Ok(valid)
}

// =============================================================================
// FIELDS COMMAND
// =============================================================================

/// Print the descriptor list for `step` (1-based, default 1) as JSON.
pub fn cmd_fields(path: &Path, step: Option<usize>, out: &mut impl Write) -> Result<(), AppError> {
    let mut state = ExamDocument::load(path)?.into_state();
    if let Some(step) = step {
        state.current_step = step
            .checked_sub(1)
            .and_then(StepIndex::new)
            .ok_or_else(|| {
                AppError::Invalid(format!("step must be between 1 and {TOTAL_QUESTIONS}, got {step}"))
            })?;
    }

    serde_json::to_writer_pretty(&mut *out, &describe(&state))?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// SUBMIT COMMAND
// =============================================================================

/// Validate a document and create or update it on the server.
pub async fn cmd_submit<S, T>(
    path: &Path,
    submitter: &S,
    tokens: &T,
    out: &mut impl Write,
) -> Result<SubmitOutcome, AppError>
where
    S: ExamSubmitter,
    T: TokenProvider,
{
    let mut ctrl = checked_controller(path)?;
    let outcome = ctrl
        .submit(submitter, tokens, || debug!("exam handed off"))
        .await?;

    match &outcome {
        SubmitOutcome::Created => writeln!(out, "Exam created")?,
        SubmitOutcome::Updated(id) => writeln!(out, "Exam {id} updated")?,
    }
    info!(path = %path.display(), "submitted exam document");
    Ok(outcome)
}

// =============================================================================
// AUTHOR COMMAND
// =============================================================================

/// Interactive authoring on stdin/stdout, optionally starting from a document.
pub async fn cmd_author<S, T>(
    from: Option<&Path>,
    submitter: &S,
    tokens: &T,
) -> Result<SessionEnd, AppError>
where
    S: ExamSubmitter,
    T: TokenProvider,
{
    let mut ctrl = match from {
        Some(path) => ExamDocument::load(path)?.into_controller(),
        None => WizardController::new(),
    };

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    let end = run_session(&mut ctrl, input, output, submitter, tokens).await?;
    info!(?end, "authoring session finished");
    Ok(end)
}
