//! # Wizard State
//!
//! The single mutable value the engine owns, plus the identifiers used to
//! address its controls and error slots.
//!
//! Fixed-length arrays carry the shape invariants: there are always exactly
//! [`TOTAL_QUESTIONS`] questions, [`OPTIONS_PER_QUESTION`] options per
//! question and [`NOTE_COUNT`] notes. The error map is a `BTreeMap` so that
//! iteration (and therefore rendering and serialization) is deterministic.

use crate::error::FieldError;
use crate::primitives::{ExamId, NOTE_COUNT, OPTIONS_PER_QUESTION, StepIndex, TOTAL_QUESTIONS};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// QUESTION
// =============================================================================

/// One authored question.
///
/// Field names on the wire follow the exam API: `question`, `answer`,
/// `options`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    #[serde(rename = "answer")]
    pub answer_text: String,
    pub options: [String; OPTIONS_PER_QUESTION],
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        options: [&str; OPTIONS_PER_QUESTION],
        answer: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            answer_text: answer.into(),
            options: options.map(String::from),
        }
    }

    /// Options that are not blank, in position order. These are the answer
    /// candidates offered to the author.
    pub fn answer_candidates(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|opt| !opt.trim().is_empty())
    }
}

// =============================================================================
// EXAM PAYLOAD
// =============================================================================

/// The body handed to the create/update collaborator on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPayload {
    pub subject_name: String,
    pub questions: [Question; TOTAL_QUESTIONS],
    pub notes: [String; NOTE_COUNT],
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable id of a rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldId {
    Subject,
    Question(StepIndex),
    Option { step: StepIndex, position: usize },
    Answer(StepIndex),
    Previous,
    Next,
    Note(usize),
}

impl FieldId {
    /// The error slot whose message this control displays, if any.
    #[must_use]
    pub fn error_key(self) -> Option<ErrorKey> {
        match self {
            Self::Subject => Some(ErrorKey::Subject),
            Self::Question(step) => Some(ErrorKey::Question(step)),
            Self::Option { step, .. } => Some(ErrorKey::Options(step)),
            Self::Answer(step) => Some(ErrorKey::Answer(step)),
            Self::Note(_) => Some(ErrorKey::Notes),
            Self::Previous | Self::Next => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => f.write_str("subjectName"),
            Self::Question(step) => write!(f, "question-{}", step.get()),
            Self::Option { step, position } => write!(f, "option-{}-{}", step.get(), position),
            Self::Answer(step) => write!(f, "answer-{}", step.get()),
            Self::Previous => f.write_str("previous"),
            Self::Next => f.write_str("next"),
            Self::Note(index) => write!(f, "note-{}", index),
        }
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Key of an error slot in [`WizardState::field_errors`].
///
/// The four option inputs of a question share one slot, as do the two notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Subject,
    Question(StepIndex),
    Options(StepIndex),
    Answer(StepIndex),
    Notes,
    /// Aggregate "not every step is complete" slot.
    Completion,
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => f.write_str("subjectName"),
            Self::Question(step) => write!(f, "question-{}", step.get()),
            Self::Options(step) => write!(f, "options-{}", step.get()),
            Self::Answer(step) => write!(f, "answer-{}", step.get()),
            Self::Notes => f.write_str("notes"),
            Self::Completion => f.write_str("completion"),
        }
    }
}

impl Serialize for ErrorKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error map. An absent key means "no known error", not "valid".
pub type FieldErrors = BTreeMap<ErrorKey, FieldError>;

// =============================================================================
// WIZARD STATE
// =============================================================================

/// Complete state of one authoring session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub subject_name: String,
    pub questions: [Question; TOTAL_QUESTIONS],
    pub notes: [String; NOTE_COUNT],
    pub current_step: StepIndex,
    pub step_completion: [bool; TOTAL_QUESTIONS],
    pub field_errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<ExamId>,
    pub submitting: bool,
}

impl WizardState {
    /// Fresh state: empty subject, empty questions and notes, step 0,
    /// nothing complete, no errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for editing an existing exam. Every step is seeded complete
    /// until the author touches it.
    #[must_use]
    pub fn for_existing(exam_id: ExamId, payload: ExamPayload) -> Self {
        Self {
            step_completion: [true; TOTAL_QUESTIONS],
            exam_id: Some(exam_id),
            ..Self::from_payload(payload)
        }
    }

    /// State for a new exam pre-filled from `payload`. Nothing is complete
    /// until validated.
    #[must_use]
    pub fn from_payload(payload: ExamPayload) -> Self {
        Self {
            subject_name: payload.subject_name,
            questions: payload.questions,
            notes: payload.notes,
            ..Self::default()
        }
    }

    /// The question on the current step.
    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.question(self.current_step)
    }

    #[must_use]
    pub fn question(&self, step: StepIndex) -> &Question {
        &self.questions[step.get()]
    }

    #[must_use]
    pub fn error(&self, key: ErrorKey) -> Option<&FieldError> {
        self.field_errors.get(&key)
    }

    #[must_use]
    pub fn is_step_complete(&self, step: StepIndex) -> bool {
        self.step_completion[step.get()]
    }

    /// True when every step last passed validation.
    #[must_use]
    pub fn all_steps_complete(&self) -> bool {
        self.step_completion.iter().all(|done| *done)
    }

    /// Number of steps that last passed validation.
    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.step_completion.iter().filter(|done| **done).count()
    }

    /// Assemble the submit body from the current data.
    #[must_use]
    pub fn payload(&self) -> ExamPayload {
        ExamPayload {
            subject_name: self.subject_name.clone(),
            questions: self.questions.clone(),
            notes: self.notes.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
