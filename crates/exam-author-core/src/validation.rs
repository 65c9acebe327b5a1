//! # Validation Rules
//!
//! Pure predicates over slices of [`WizardState`]. No function here touches
//! the store; the controller decides where results are written.
//!
//! All comparisons trim surrounding whitespace and are case-sensitive.

use crate::error::FieldError;
use crate::primitives::{NOTE_COUNT, OPTIONS_PER_QUESTION, StepIndex};
use crate::state::{FieldId, Question, WizardState};

/// Outcome of a single rule.
pub type RuleResult = Result<(), FieldError>;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// True when any two entries are equal after trimming.
fn has_duplicates<S: AsRef<str>>(values: &[S]) -> bool {
    values.iter().enumerate().any(|(i, a)| {
        values[i.saturating_add(1)..]
            .iter()
            .any(|b| a.as_ref().trim() == b.as_ref().trim())
    })
}

// =============================================================================
// FIELD RULES
// =============================================================================

pub fn validate_subject(name: &str) -> RuleResult {
    if is_blank(name) {
        return Err(FieldError::SubjectRequired);
    }
    Ok(())
}

/// Check a question's text against emptiness and against every *other*
/// question's text.
pub fn validate_question_text(index: StepIndex, text: &str, all: &[Question]) -> RuleResult {
    if is_blank(text) {
        return Err(FieldError::EmptyQuestion);
    }
    let trimmed = text.trim();
    let duplicate = all
        .iter()
        .enumerate()
        .any(|(i, other)| i != index.get() && other.text.trim() == trimmed);
    if duplicate {
        return Err(FieldError::DuplicateQuestion);
    }
    Ok(())
}

pub fn validate_options(options: &[String; OPTIONS_PER_QUESTION]) -> RuleResult {
    if options.iter().any(|opt| is_blank(opt)) {
        return Err(FieldError::MissingOptions);
    }
    if has_duplicates(options) {
        return Err(FieldError::DuplicateOption);
    }
    Ok(())
}

/// Check the option just edited while the author types.
///
/// Unlike [`validate_options`], blank *other* options are tolerated: the
/// author has not reached them yet.
pub fn validate_option_input(position: usize, options: &[String; OPTIONS_PER_QUESTION]) -> RuleResult {
    if options.get(position).is_none_or(|opt| is_blank(opt)) {
        return Err(FieldError::EmptyOption);
    }
    let filled: Vec<&str> = options
        .iter()
        .map(String::as_str)
        .filter(|opt| !is_blank(opt))
        .collect();
    if has_duplicates(&filled) {
        return Err(FieldError::DuplicateOption);
    }
    Ok(())
}

/// Only presence is checked. Whether the answer is one of the options is
/// left to the selector, which only offers option values.
pub fn validate_answer(answer: &str) -> RuleResult {
    if is_blank(answer) {
        return Err(FieldError::AnswerRequired);
    }
    Ok(())
}

pub fn validate_notes(first: &str, second: &str) -> RuleResult {
    if is_blank(first) || is_blank(second) {
        return Err(FieldError::NotesRequired);
    }
    if first.trim() == second.trim() {
        return Err(FieldError::DuplicateNotes);
    }
    Ok(())
}

pub fn validate_completion(completion: &[bool]) -> RuleResult {
    if completion.iter().all(|done| *done) {
        Ok(())
    } else {
        Err(FieldError::incomplete())
    }
}

// =============================================================================
// STEP RULES
// =============================================================================

/// Per-field outcome of validating one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub question: RuleResult,
    pub options: RuleResult,
    pub answer: RuleResult,
}

impl StepReport {
    pub fn is_valid(&self) -> bool {
        self.question.is_ok() && self.options.is_ok() && self.answer.is_ok()
    }
}

/// Run the three question rules against `questions[step]`.
pub fn check_step(step: StepIndex, questions: &[Question]) -> StepReport {
    let Some(question) = questions.get(step.get()) else {
        return StepReport {
            question: Err(FieldError::EmptyQuestion),
            options: Err(FieldError::MissingOptions),
            answer: Err(FieldError::AnswerRequired),
        };
    };
    StepReport {
        question: validate_question_text(step, &question.text, questions),
        options: validate_options(&question.options),
        answer: validate_answer(&question.answer_text),
    }
}

// =============================================================================
// GENERIC FIELD VALIDATOR
// =============================================================================

/// Validator for fields that do not need cross-entry rules.
///
/// `value` is the freshly entered text; `state` is the state *before* the
/// edit is applied.
pub trait FieldValidator {
    fn validate(&self, field: FieldId, value: &str, state: &WizardState) -> Option<FieldError>;
}

/// Default validator: required-field messages for subject, answer and notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFields;

impl FieldValidator for RequiredFields {
    fn validate(&self, field: FieldId, value: &str, _state: &WizardState) -> Option<FieldError> {
        if !is_blank(value) {
            return None;
        }
        match field {
            FieldId::Subject => Some(FieldError::SubjectRequired),
            FieldId::Answer(_) => Some(FieldError::AnswerRequired),
            FieldId::Note(index) if index < NOTE_COUNT => Some(FieldError::NotesRequired),
            _ => None,
        }
    }
}

impl<F> FieldValidator for F
where
    F: Fn(FieldId, &str, &WizardState) -> Option<FieldError>,
{
    fn validate(&self, field: FieldId, value: &str, state: &WizardState) -> Option<FieldError> {
        self(field, value, state)
    }
}

// =============================================================================
// TESTS
// =============================================================================
