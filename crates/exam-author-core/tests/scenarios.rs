//! End-to-end authoring scenarios driven through the controller.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use exam_author_core::{
    Binding, Direction, ErrorKey, ExamId, ExamPayload, ExamSubmitter, FieldError, FieldInput,
    OnSaved, Question, SaveRequest, StaticToken, StepIndex, SubmitError, SubmitOutcome,
    TOTAL_QUESTIONS, WizardController, describe,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

// =============================================================================
// HELPERS
// =============================================================================

#[derive(Debug, Error)]
#[error("server unavailable")]
struct Unavailable;

#[derive(Debug, Clone)]
struct Call {
    payload: ExamPayload,
    exam_id: Option<ExamId>,
    token: Option<String>,
}

/// Collaborator that records every call and optionally fails.
#[derive(Default)]
struct RecordingSubmitter {
    calls: RefCell<Vec<Call>>,
    fail: bool,
}

impl RecordingSubmitter {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ExamSubmitter for RecordingSubmitter {
    type Error = Unavailable;

    async fn save_exam(&self, request: SaveRequest<'_>, on_saved: OnSaved) -> Result<(), Unavailable> {
        self.calls.borrow_mut().push(Call {
            payload: request.payload.clone(),
            exam_id: request.exam_id.cloned(),
            token: request.token.map(String::from),
        });
        if self.fail {
            return Err(Unavailable);
        }
        on_saved();
        Ok(())
    }
}

fn step(i: usize) -> StepIndex {
    StepIndex::new(i).unwrap()
}

/// Fill the current step with a valid question.
fn author_step(ctrl: &mut WizardController, text: &str) {
    ctrl.set_question_text(text);
    for (i, opt) in ["3", "4", "5", "6"].iter().enumerate() {
        ctrl.set_option(i, opt);
    }
    ctrl.set_answer("4");
}

/// Author a complete, valid exam and stay on the last step.
fn author_full_exam(ctrl: &mut WizardController) {
    ctrl.set_subject("Arithmetic");
    for i in 0..TOTAL_QUESTIONS {
        author_step(ctrl, &format!("Question {i}"));
        if i + 1 < TOTAL_QUESTIONS {
            assert!(ctrl.navigate(Direction::Next), "step {i} should validate");
        }
    }
    ctrl.set_note(0, "Be concise");
    ctrl.set_note(1, "Show your work");
}

fn full_payload() -> ExamPayload {
    ExamPayload {
        subject_name: "Geography".to_string(),
        questions: std::array::from_fn(|i| {
            Question::new(format!("Where is city {i}?"), ["N", "S", "E", "W"], "N")
        }),
        notes: ["Maps allowed".to_string(), "No phones".to_string()],
    }
}

// =============================================================================
// EXAMPLE SCENARIOS
// =============================================================================

#[test]
fn simple_question_validates_and_advances() {
    let mut ctrl = WizardController::new();
    ctrl.set_question_text("2+2=?");
    for (i, opt) in ["3", "4", "5", "6"].iter().enumerate() {
        ctrl.set_option(i, opt);
    }
    ctrl.set_answer("4");

    assert!(ctrl.validate_step(step(0)));
    assert!(ctrl.state().is_step_complete(step(0)));
    assert!(ctrl.go_to_step(step(1), step(0)));
    assert_eq!(ctrl.current_step(), step(1));
}

#[test]
fn duplicate_question_blocks_later_step() {
    let mut ctrl = WizardController::new();
    author_step(&mut ctrl, "Capital of France?");
    assert!(ctrl.navigate(Direction::Next));
    author_step(&mut ctrl, "Capital of Spain?");
    assert!(ctrl.navigate(Direction::Next));

    author_step(&mut ctrl, "Capital of France?");
    assert_eq!(
        ctrl.state().error(ErrorKey::Question(step(2))),
        Some(&FieldError::DuplicateQuestion)
    );
    assert!(!ctrl.validate_step(step(2)));
    assert!(!ctrl.navigate(Direction::Next));
    assert_eq!(ctrl.current_step(), step(2));
    assert_eq!(
        ctrl.state().error(ErrorKey::Question(step(2))),
        Some(&FieldError::DuplicateQuestion)
    );
}

#[tokio::test]
async fn identical_notes_refuse_submit() {
    let mut ctrl = WizardController::new();
    author_full_exam(&mut ctrl);
    ctrl.set_note(1, "Be concise");

    let submitter = RecordingSubmitter::default();
    let result = ctrl
        .submit(&submitter, &StaticToken::new("tok"), || {})
        .await;

    match result {
        Err(SubmitError::Invalid(report)) => {
            assert_eq!(report.get(ErrorKey::Notes), Some(&FieldError::DuplicateNotes));
            assert_eq!(report.len(), 1);
        }
        other => panic!("expected validation refusal, got {other:?}"),
    }
    assert_eq!(submitter.call_count(), 0);
    assert_eq!(
        ctrl.state().error(ErrorKey::Notes),
        Some(&FieldError::DuplicateNotes)
    );
}

// =============================================================================
// SUBMIT FLOWS
// =============================================================================

#[tokio::test]
async fn complete_exam_is_created() {
    let mut ctrl = WizardController::new();
    author_full_exam(&mut ctrl);

    let flags = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&flags);
    ctrl.subscribe(move |state| sink.borrow_mut().push(state.submitting));

    let navigated = Arc::new(AtomicBool::new(false));
    let nav = Arc::clone(&navigated);
    let submitter = RecordingSubmitter::default();

    let outcome = ctrl
        .submit(&submitter, &StaticToken::new("secret"), move || {
            nav.store(true, Ordering::SeqCst);
        })
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Created);
    assert!(navigated.load(Ordering::SeqCst));

    let calls = submitter.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].payload.subject_name, "Arithmetic");
    assert_eq!(calls[0].payload.questions[14].text, "Question 14");
    assert_eq!(calls[0].exam_id, None);
    assert_eq!(calls[0].token.as_deref(), Some("secret"));

    let flags = flags.borrow();
    assert!(flags.contains(&true));
    assert_eq!(flags.last(), Some(&false));
    assert!(!ctrl.state().submitting);
}

#[tokio::test]
async fn existing_exam_is_updated() {
    let mut ctrl = WizardController::for_exam(ExamId::new("exam-7"), full_payload());
    let submitter = RecordingSubmitter::default();

    let outcome = ctrl
        .submit(&submitter, &StaticToken::anonymous(), || {})
        .await
        .unwrap();

    assert_eq!(outcome, SubmitOutcome::Updated(ExamId::new("exam-7")));
    let calls = submitter.calls.borrow();
    assert_eq!(calls[0].exam_id, Some(ExamId::new("exam-7")));
    assert_eq!(calls[0].token, None);
}

#[tokio::test]
async fn incomplete_steps_refuse_submit() {
    let mut ctrl = WizardController::new();
    ctrl.set_subject("Arithmetic");
    author_step(&mut ctrl, "Only one");
    ctrl.set_note(0, "a");
    ctrl.set_note(1, "b");

    let submitter = RecordingSubmitter::default();
    let err = ctrl
        .submit(&submitter, &StaticToken::anonymous(), || {})
        .await
        .unwrap_err();

    match err {
        SubmitError::Invalid(report) => {
            assert_eq!(report.get(ErrorKey::Completion), Some(&FieldError::incomplete()));
            assert_eq!(report.len(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(submitter.call_count(), 0);
}

#[tokio::test]
async fn collaborator_failure_releases_submitting() {
    let mut ctrl = WizardController::new();
    author_full_exam(&mut ctrl);
    let submitter = RecordingSubmitter::failing();

    let err = ctrl
        .submit(&submitter, &StaticToken::anonymous(), || {
            panic!("must not navigate on failure")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Collaborator(_)));
    assert_eq!(err.to_string(), "Submit failed: server unavailable");
    assert_eq!(submitter.call_count(), 1);
    assert!(!ctrl.state().submitting);
    assert_eq!(ctrl.state().subject_name, "Arithmetic");
}

#[tokio::test]
async fn second_submit_while_flag_set_is_refused() {
    use exam_author_core::{Action, FormStateStore, WizardState};

    let mut store = FormStateStore::with_state(WizardState::for_existing(
        ExamId::new("e"),
        full_payload(),
    ));
    store.dispatch(Action::SetSubmitting(true));
    let mut ctrl = WizardController::from_store(store);

    let submitter = RecordingSubmitter::default();
    let err = ctrl
        .submit(&submitter, &StaticToken::anonymous(), || {})
        .await
        .unwrap_err();
    assert!(matches!(err, SubmitError::AlreadySubmitting));
    assert_eq!(submitter.call_count(), 0);
}

// =============================================================================
// RENDERER ROUND TRIP
// =============================================================================

#[test]
fn descriptors_drive_the_controller() {
    let mut ctrl = WizardController::new();

    let fields = describe(ctrl.state());
    let question = fields
        .iter()
        .find(|f| f.handler == Binding::QuestionText)
        .unwrap();
    ctrl.handle(question.handler, FieldInput::Change("2+2=?".to_string()));

    for (i, opt) in ["3", "4", "5", "6"].iter().enumerate() {
        ctrl.handle(Binding::Option(i), FieldInput::Change(opt.to_string()));
    }

    let fields = describe(ctrl.state());
    let answer = &fields[6];
    match &answer.kind {
        exam_author_core::ControlKind::SingleSelect { choices } => {
            assert_eq!(choices, &vec!["3", "4", "5", "6"]);
        }
        other => panic!("answer should be a selector, got {other:?}"),
    }
    ctrl.handle(answer.handler, FieldInput::Change("4".to_string()));

    let next = describe(ctrl.state())[8].handler;
    assert!(ctrl.handle(next, FieldInput::Click));
    assert_eq!(ctrl.current_step(), step(1));

    let fields = describe(ctrl.state());
    assert_eq!(fields[1].label, "Question: 2 / 15");
    assert!(!fields[7].is_disabled());
}

#[test]
fn editing_seeds_completion_until_first_failed_step() {
    let mut payload = full_payload();
    payload.questions[3].text.clear();
    let mut ctrl = WizardController::for_exam(ExamId::new("x"), payload);

    assert!(ctrl.state().all_steps_complete());
    assert!(!ctrl.go_to_step(step(4), step(3)));
    assert!(!ctrl.state().is_step_complete(step(3)));
    assert_eq!(ctrl.state().completed_steps(), TOTAL_QUESTIONS - 1);
}

#[test]
fn reset_discards_everything() {
    let mut ctrl = WizardController::for_exam(ExamId::new("x"), full_payload());
    ctrl.set_subject("");
    ctrl.reset();

    assert_eq!(ctrl.state(), &exam_author_core::WizardState::default());
    assert!(describe(ctrl.state()).iter().all(|f| f.error.is_none()));
}
