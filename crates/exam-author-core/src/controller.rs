//! # Wizard Controller
//!
//! Orchestrates the authoring wizard on top of [`FormStateStore`]:
//! step validation, navigation gating, completion tracking, live field
//! edits, submit and reset.
//!
//! The wizard is always in `Editing(current_step)`. Completion is tracked
//! separately in `step_completion` and only changes when a step is validated
//! (on navigation, on submit, or when an existing exam is loaded).

use crate::collab::{ExamSubmitter, SaveRequest, TokenProvider};
use crate::error::{SubmitError, ValidationReport};
use crate::fields::{Binding, FieldInput};
use crate::primitives::{ExamId, OPTIONS_PER_QUESTION, StepIndex};
use crate::state::{ErrorKey, ExamPayload, FieldId, WizardState};
use crate::store::{Action, ErrorPatch, FormStateStore, StatePatch, SubscriptionId};
use crate::validation::{
    FieldValidator, RequiredFields, StepReport, check_step, validate_completion, validate_notes,
    validate_option_input, validate_question_text, validate_subject,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Direction of a previous/next click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated(ExamId),
}

// =============================================================================
// SUBMITTING GUARD
// =============================================================================

/// Holds `submitting = true` for its lifetime.
///
/// Dropping the guard clears the flag on every exit path: success, collaborator
/// error, or the submit future being dropped mid-flight.
struct SubmittingGuard<'a> {
    store: &'a mut FormStateStore,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(store: &'a mut FormStateStore) -> Self {
        store.dispatch(Action::SetSubmitting(true));
        Self { store }
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetSubmitting(false));
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// The single writer of a wizard session.
#[derive(Debug)]
pub struct WizardController<V = RequiredFields> {
    store: FormStateStore,
    validator: V,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    /// A controller over a fresh, default state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: FormStateStore::new(),
            validator: RequiredFields,
        }
    }

    /// Take over an existing store, e.g. one restored by the caller.
    #[must_use]
    pub fn from_store(store: FormStateStore) -> Self {
        Self {
            store,
            validator: RequiredFields,
        }
    }

    /// A controller editing an existing exam.
    #[must_use]
    pub fn for_exam(exam_id: ExamId, payload: ExamPayload) -> Self {
        Self {
            store: FormStateStore::with_state(WizardState::for_existing(exam_id, payload)),
            validator: RequiredFields,
        }
    }
}

impl<V: FieldValidator> WizardController<V> {
    /// Replace the generic field validator used for live edits.
    pub fn with_validator<W: FieldValidator>(self, validator: W) -> WizardController<W> {
        WizardController {
            store: self.store,
            validator,
        }
    }

    pub fn state(&self) -> &WizardState {
        self.store.state()
    }

    pub fn current_step(&self) -> StepIndex {
        self.state().current_step
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&WizardState) + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Switch to editing an existing exam. Every step is seeded complete.
    pub fn load_exam(&mut self, exam_id: ExamId, payload: ExamPayload) {
        let ExamPayload {
            subject_name,
            questions,
            notes,
        } = payload;
        info!(exam_id = %exam_id, "loading exam for editing");
        self.store.dispatch(Action::SetData(
            StatePatch::new()
                .subject_name(subject_name)
                .questions(questions)
                .notes(notes)
                .current_step(StepIndex::FIRST)
                .step_completion([true; crate::primitives::TOTAL_QUESTIONS])
                .exam_id(Some(exam_id)),
        ));
        self.store.dispatch(Action::ReplaceError(BTreeMap::new()));
    }

    /// Restore the default state and drop every error.
    pub fn reset(&mut self) {
        debug!("reset");
        self.store.dispatch(Action::Reset);
    }

    // -------------------------------------------------------------------------
    // Step validation and navigation
    // -------------------------------------------------------------------------

    fn apply_step_check(&mut self, step: StepIndex) -> StepReport {
        let report = check_step(step, &self.state().questions);
        let valid = report.is_valid();

        self.store.dispatch(Action::SetError(
            ErrorPatch::new()
                .set(ErrorKey::Question(step), report.question.clone())
                .set(ErrorKey::Options(step), report.options.clone())
                .set(ErrorKey::Answer(step), report.answer.clone()),
        ));
        self.store.dispatch(Action::SetData(
            StatePatch::new().step_complete(step, valid),
        ));
        if valid && self.state().all_steps_complete() {
            self.store
                .dispatch(Action::SetError(ErrorPatch::new().clear(ErrorKey::Completion)));
        }

        debug!(step = step.get(), valid, "validated step");
        report
    }

    /// Validate `questions[step]`, record its errors and completion flag.
    pub fn validate_step(&mut self, step: StepIndex) -> bool {
        self.apply_step_check(step).is_valid()
    }

    /// Validate every step. Used when checking a whole exam at once.
    pub fn validate_all_steps(&mut self) -> bool {
        StepIndex::all().fold(true, |all, step| self.validate_step(step) && all)
    }

    /// Move to `target` if step `from` validates; otherwise stay put.
    pub fn go_to_step(&mut self, target: StepIndex, from: StepIndex) -> bool {
        if !self.validate_step(from) {
            debug!(from = from.get(), target = target.get(), "navigation blocked");
            return false;
        }
        self.store
            .dispatch(Action::SetData(StatePatch::new().current_step(target)));
        true
    }

    /// Previous/next from the current step. A no-op at the boundaries, where
    /// the corresponding button is disabled.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let from = self.current_step();
        let target = match direction {
            Direction::Previous => from.previous(),
            Direction::Next => from.next(),
        };
        match target {
            Some(target) => self.go_to_step(target, from),
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Live edits
    // -------------------------------------------------------------------------

    pub fn set_subject(&mut self, value: &str) {
        let error = self
            .validator
            .validate(FieldId::Subject, value, self.store.state());
        self.store
            .dispatch(Action::SetData(StatePatch::new().subject_name(value)));
        self.store
            .dispatch(Action::SetError(ErrorPatch::new().error(ErrorKey::Subject, error)));
    }

    /// Edit the current question's text, checking it against the others.
    pub fn set_question_text(&mut self, value: &str) {
        let step = self.current_step();
        let outcome = validate_question_text(step, value, &self.state().questions);
        let mut question = self.state().question(step).clone();
        question.text = value.to_string();

        self.store
            .dispatch(Action::SetData(StatePatch::new().question(step, question)));
        self.store
            .dispatch(Action::SetError(ErrorPatch::new().set(ErrorKey::Question(step), outcome)));
    }

    /// Edit one option of the current question. The chosen answer is cleared
    /// because it may no longer match any option.
    pub fn set_option(&mut self, position: usize, value: &str) {
        if position >= OPTIONS_PER_QUESTION {
            warn!(position, "ignoring edit of nonexistent option");
            return;
        }
        let step = self.current_step();
        let mut question = self.state().question(step).clone();
        question.options[position] = value.to_string();
        question.answer_text.clear();
        let outcome = validate_option_input(position, &question.options);

        self.store
            .dispatch(Action::SetData(StatePatch::new().question(step, question)));
        self.store
            .dispatch(Action::SetError(ErrorPatch::new().set(ErrorKey::Options(step), outcome)));
    }

    pub fn set_answer(&mut self, value: &str) {
        let step = self.current_step();
        let error = self
            .validator
            .validate(FieldId::Answer(step), value, self.store.state());
        let mut question = self.state().question(step).clone();
        question.answer_text = value.to_string();

        self.store
            .dispatch(Action::SetData(StatePatch::new().question(step, question)));
        self.store
            .dispatch(Action::SetError(ErrorPatch::new().error(ErrorKey::Answer(step), error)));
    }

    pub fn set_note(&mut self, index: usize, value: &str) {
        let mut notes = self.state().notes.clone();
        let Some(slot) = notes.get_mut(index) else {
            warn!(index, "ignoring edit of nonexistent note");
            return;
        };
        *slot = value.to_string();
        let error = self
            .validator
            .validate(FieldId::Note(index), value, self.store.state());

        self.store
            .dispatch(Action::SetData(StatePatch::new().notes(notes)));
        self.store
            .dispatch(Action::SetError(ErrorPatch::new().error(ErrorKey::Notes, error)));
    }

    /// Route a descriptor handler to the matching operation.
    ///
    /// Returns false when the input had no effect: a refused navigation, a
    /// disabled boundary button, or a click on a text input.
    pub fn handle(&mut self, binding: Binding, input: FieldInput) -> bool {
        match (binding, input) {
            (Binding::Previous, _) => self.navigate(Direction::Previous),
            (Binding::Next, _) => self.navigate(Direction::Next),
            (_, FieldInput::Click) => false,
            (Binding::Subject, FieldInput::Change(value)) => {
                self.set_subject(&value);
                true
            }
            (Binding::QuestionText, FieldInput::Change(value)) => {
                self.set_question_text(&value);
                true
            }
            (Binding::Option(position), FieldInput::Change(value)) => {
                self.set_option(position, &value);
                position < OPTIONS_PER_QUESTION
            }
            (Binding::Answer, FieldInput::Change(value)) => {
                self.set_answer(&value);
                true
            }
            (Binding::Note(index), FieldInput::Change(value)) => {
                self.set_note(index, &value);
                index < self.state().notes.len()
            }
        }
    }

    // -------------------------------------------------------------------------
    // Submit
    // -------------------------------------------------------------------------

    /// Run every submit gate and write the errors for display.
    ///
    /// Gates: the current step validates, the subject is present, the notes
    /// are present and distinct, and every step is complete.
    pub fn preflight(&mut self) -> Result<ExamPayload, ValidationReport> {
        let step = self.current_step();
        let step_report = self.apply_step_check(step);

        let state = self.state();
        let subject = validate_subject(&state.subject_name);
        let notes = validate_notes(&state.notes[0], &state.notes[1]);
        let completion = validate_completion(&state.step_completion);

        let mut report = ValidationReport::new();
        let checks = [
            (ErrorKey::Subject, &subject),
            (ErrorKey::Question(step), &step_report.question),
            (ErrorKey::Options(step), &step_report.options),
            (ErrorKey::Answer(step), &step_report.answer),
            (ErrorKey::Notes, &notes),
            (ErrorKey::Completion, &completion),
        ];
        for (key, outcome) in checks {
            if let Err(error) = outcome {
                report.push(key, error.clone());
            }
        }

        self.store.dispatch(Action::SetError(
            ErrorPatch::new()
                .set(ErrorKey::Subject, subject)
                .set(ErrorKey::Notes, notes)
                .set(ErrorKey::Completion, completion),
        ));

        if report.is_empty() {
            Ok(self.state().payload())
        } else {
            Err(report)
        }
    }

    /// Validate, then hand the exam to the create/update collaborator.
    ///
    /// No collaborator call is made unless every gate passes. `submitting`
    /// is set for the duration of the call and always cleared afterwards.
    pub async fn submit<S, T>(
        &mut self,
        submitter: &S,
        tokens: &T,
        on_saved: impl FnOnce() + Send + 'static,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        S: ExamSubmitter,
        T: TokenProvider,
    {
        if self.state().submitting {
            warn!("submit ignored: already submitting");
            return Err(SubmitError::AlreadySubmitting);
        }

        let payload = match self.preflight() {
            Ok(payload) => payload,
            Err(report) => {
                warn!(errors = report.len(), "submit refused by validation");
                return Err(SubmitError::Invalid(report));
            }
        };

        let exam_id = self.state().exam_id.clone();
        let token = tokens.token();
        let outcome = match &exam_id {
            Some(id) => SubmitOutcome::Updated(id.clone()),
            None => SubmitOutcome::Created,
        };
        info!(update = exam_id.is_some(), "submitting exam");

        let guard = SubmittingGuard::acquire(&mut self.store);
        let request = SaveRequest {
            payload: &payload,
            exam_id: exam_id.as_ref(),
            token: token.as_deref(),
        };
        let result = submitter.save_exam(request, Box::new(on_saved)).await;
        drop(guard);

        match result {
            Ok(()) => Ok(outcome),
            Err(err) => {
                warn!(error = %err, "submit failed");
                Err(SubmitError::Collaborator(Box::new(err)))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::primitives::TOTAL_QUESTIONS;
    use crate::state::Question;

    fn step(i: usize) -> StepIndex {
        StepIndex::new(i).unwrap_or_default()
    }

    fn fill_current(ctrl: &mut WizardController, text: &str) {
        ctrl.set_question_text(text);
        for (i, opt) in ["a", "b", "c", "d"].iter().enumerate() {
            ctrl.set_option(i, opt);
        }
        ctrl.set_answer("a");
    }

    #[test]
    fn validate_step_sets_completion_and_errors() {
        let mut ctrl = WizardController::new();
        assert!(!ctrl.validate_step(step(0)));
        assert!(!ctrl.state().is_step_complete(step(0)));
        assert_eq!(
            ctrl.state().error(ErrorKey::Question(step(0))),
            Some(&FieldError::EmptyQuestion)
        );
        assert_eq!(
            ctrl.state().error(ErrorKey::Options(step(0))),
            Some(&FieldError::MissingOptions)
        );

        fill_current(&mut ctrl, "Q1");
        assert!(ctrl.validate_step(step(0)));
        assert!(ctrl.state().is_step_complete(step(0)));
        assert_eq!(ctrl.state().error(ErrorKey::Question(step(0))), None);
        assert_eq!(ctrl.state().error(ErrorKey::Options(step(0))), None);
    }

    #[test]
    fn navigation_is_gated_on_validity() {
        let mut ctrl = WizardController::new();
        assert!(!ctrl.navigate(Direction::Next));
        assert_eq!(ctrl.current_step(), StepIndex::FIRST);

        fill_current(&mut ctrl, "Q1");
        assert!(ctrl.navigate(Direction::Next));
        assert_eq!(ctrl.current_step(), step(1));
    }

    #[test]
    fn boundaries_are_disabled() {
        let mut ctrl = WizardController::new();
        fill_current(&mut ctrl, "Q1");
        assert!(!ctrl.navigate(Direction::Previous));
        assert_eq!(ctrl.current_step(), StepIndex::FIRST);
    }

    #[test]
    fn failed_navigation_marks_step_incomplete() {
        let mut ctrl = WizardController::for_exam(ExamId::new("e"), ExamPayload::default());
        assert!(ctrl.state().is_step_complete(step(0)));
        assert!(!ctrl.go_to_step(step(1), step(0)));
        assert!(!ctrl.state().is_step_complete(step(0)));
    }

    #[test]
    fn option_edit_clears_answer() {
        let mut ctrl = WizardController::new();
        fill_current(&mut ctrl, "Q1");
        assert_eq!(ctrl.state().current_question().answer_text, "a");

        ctrl.set_option(2, "z");
        assert_eq!(ctrl.state().current_question().answer_text, "");
        assert_eq!(ctrl.state().current_question().options[2], "z");
    }

    #[test]
    fn option_edit_reports_live_errors() {
        let mut ctrl = WizardController::new();
        ctrl.set_option(0, "same");
        ctrl.set_option(1, "same");
        assert_eq!(
            ctrl.state().error(ErrorKey::Options(step(0))),
            Some(&FieldError::DuplicateOption)
        );
        ctrl.set_option(1, "");
        assert_eq!(
            ctrl.state().error(ErrorKey::Options(step(0))),
            Some(&FieldError::EmptyOption)
        );
        ctrl.set_option(1, "other");
        assert_eq!(ctrl.state().error(ErrorKey::Options(step(0))), None);
    }

    #[test]
    fn out_of_range_edits_are_ignored() {
        let mut ctrl = WizardController::new();
        ctrl.set_option(OPTIONS_PER_QUESTION, "x");
        ctrl.set_note(5, "x");
        assert_eq!(ctrl.state(), &WizardState::default());
    }

    #[test]
    fn live_subject_and_note_errors_use_validator() {
        let mut ctrl = WizardController::new();
        ctrl.set_subject("");
        assert_eq!(
            ctrl.state().error(ErrorKey::Subject),
            Some(&FieldError::SubjectRequired)
        );
        ctrl.set_subject("Math");
        assert_eq!(ctrl.state().error(ErrorKey::Subject), None);

        ctrl.set_note(1, " ");
        assert_eq!(
            ctrl.state().error(ErrorKey::Notes),
            Some(&FieldError::NotesRequired)
        );
    }

    #[test]
    fn custom_validator_is_consulted() {
        let mut ctrl = WizardController::new().with_validator(
            |field: FieldId, value: &str, _: &WizardState| {
                (field == FieldId::Subject && value.len() < 3)
                    .then(|| FieldError::Custom("Subject too short".to_string()))
            },
        );
        ctrl.set_subject("AB");
        assert_eq!(
            ctrl.state().error(ErrorKey::Subject),
            Some(&FieldError::Custom("Subject too short".to_string()))
        );
    }

    #[test]
    fn handle_routes_bindings() {
        let mut ctrl = WizardController::new();
        assert!(ctrl.handle(Binding::Subject, FieldInput::Change("Bio".to_string())));
        assert!(ctrl.handle(Binding::QuestionText, FieldInput::Change("Q".to_string())));
        assert!(!ctrl.handle(Binding::Subject, FieldInput::Click));
        assert!(!ctrl.handle(Binding::Next, FieldInput::Click));
        assert_eq!(ctrl.state().subject_name, "Bio");
        assert_eq!(ctrl.state().current_question().text, "Q");
    }

    #[test]
    fn preflight_collects_every_gate() {
        let mut ctrl = WizardController::new();
        let report = ctrl.preflight().err().unwrap_or_default();

        assert_eq!(report.get(ErrorKey::Subject), Some(&FieldError::SubjectRequired));
        assert_eq!(report.get(ErrorKey::Notes), Some(&FieldError::NotesRequired));
        assert_eq!(report.get(ErrorKey::Completion), Some(&FieldError::incomplete()));
        assert_eq!(
            report.get(ErrorKey::Question(step(0))),
            Some(&FieldError::EmptyQuestion)
        );
        assert!(ctrl.state().error(ErrorKey::Completion).is_some());
    }

    #[test]
    fn completing_every_step_clears_completion_error() {
        let questions: [Question; TOTAL_QUESTIONS] = std::array::from_fn(|i| {
            Question::new(format!("Q{i}"), ["a", "b", "c", "d"], "a")
        });
        let payload = ExamPayload {
            subject_name: "S".to_string(),
            questions,
            notes: ["n1".to_string(), "n2".to_string()],
        };
        let mut ctrl = WizardController::new();
        ctrl.load_exam(ExamId::new("x"), payload);
        ctrl.store.dispatch(Action::SetData(
            StatePatch::new().step_completion([false; TOTAL_QUESTIONS]),
        ));
        assert!(ctrl.preflight().is_err());
        assert!(ctrl.state().error(ErrorKey::Completion).is_some());

        assert!(ctrl.validate_all_steps());
        assert_eq!(ctrl.state().error(ErrorKey::Completion), None);
    }

    #[test]
    fn reset_returns_to_default() {
        let mut ctrl = WizardController::new();
        fill_current(&mut ctrl, "Q1");
        ctrl.navigate(Direction::Next);
        ctrl.reset();
        assert_eq!(ctrl.state(), &WizardState::default());
    }
}
