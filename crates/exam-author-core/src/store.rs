//! # Form State Store
//!
//! Owns the [`WizardState`] and applies [`Action`]s to it, one at a time.
//!
//! The store is the only place the state is mutated. `dispatch` takes
//! `&mut self`, so two actions can never interleave; subscribers run after
//! each action has been fully applied and see the committed state.

use crate::error::FieldError;
use crate::primitives::{ExamId, NOTE_COUNT, StepIndex, TOTAL_QUESTIONS};
use crate::state::{ErrorKey, FieldErrors, Question, WizardState};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// PATCHES
// =============================================================================

/// Partial update of the data fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub subject_name: Option<String>,
    pub questions: Option<[Question; TOTAL_QUESTIONS]>,
    /// Replace a single question slot.
    pub question: Option<(StepIndex, Question)>,
    pub notes: Option<[String; NOTE_COUNT]>,
    pub current_step: Option<StepIndex>,
    pub step_completion: Option<[bool; TOTAL_QUESTIONS]>,
    /// Set one completion flag.
    pub step_complete: Option<(StepIndex, bool)>,
    pub exam_id: Option<Option<ExamId>>,
}

impl StatePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn questions(mut self, questions: [Question; TOTAL_QUESTIONS]) -> Self {
        self.questions = Some(questions);
        self
    }

    #[must_use]
    pub fn question(mut self, step: StepIndex, question: Question) -> Self {
        self.question = Some((step, question));
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: [String; NOTE_COUNT]) -> Self {
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn current_step(mut self, step: StepIndex) -> Self {
        self.current_step = Some(step);
        self
    }

    #[must_use]
    pub fn step_completion(mut self, completion: [bool; TOTAL_QUESTIONS]) -> Self {
        self.step_completion = Some(completion);
        self
    }

    #[must_use]
    pub fn step_complete(mut self, step: StepIndex, complete: bool) -> Self {
        self.step_complete = Some((step, complete));
        self
    }

    #[must_use]
    pub fn exam_id(mut self, exam_id: Option<ExamId>) -> Self {
        self.exam_id = Some(exam_id);
        self
    }
}

/// Partial update of the error map. `None` removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorPatch(pub BTreeMap<ErrorKey, Option<FieldError>>);

impl ErrorPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rule outcome: `Err` sets the key, `Ok` clears it.
    #[must_use]
    pub fn set(mut self, key: ErrorKey, outcome: Result<(), FieldError>) -> Self {
        self.0.insert(key, outcome.err());
        self
    }

    #[must_use]
    pub fn error(mut self, key: ErrorKey, error: Option<FieldError>) -> Self {
        self.0.insert(key, error);
        self
    }

    #[must_use]
    pub fn clear(mut self, key: ErrorKey) -> Self {
        self.0.insert(key, None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// The closed set of state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetData(StatePatch),
    SetError(ErrorPatch),
    ReplaceError(FieldErrors),
    Reset,
    SetSubmitting(bool),
}

impl Action {
    /// Short tag for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SetData(_) => "SET_DATA",
            Self::SetError(_) => "SET_ERROR",
            Self::ReplaceError(_) => "REPLACE_ERROR",
            Self::Reset => "RESET",
            Self::SetSubmitting(_) => "SET_SUBMITTING",
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Handle returned by [`FormStateStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&WizardState)>;

/// Single-writer owner of the wizard state.
#[derive(Default)]
pub struct FormStateStore {
    state: WizardState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl fmt::Debug for FormStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStateStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl FormStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given state instead of the defaults.
    #[must_use]
    pub fn with_state(state: WizardState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Register a callback fired after every applied action.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&WizardState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Apply one action and notify subscribers.
    pub fn dispatch(&mut self, action: Action) -> &WizardState {
        tracing::trace!(action = action.tag(), "dispatch");
        apply(&mut self.state, action);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
        &self.state
    }
}

fn apply(state: &mut WizardState, action: Action) {
    match action {
        Action::SetData(patch) => merge_data(state, patch),
        Action::SetError(patch) => {
            for (key, error) in patch.0 {
                match error {
                    Some(error) => {
                        state.field_errors.insert(key, error);
                    }
                    None => {
                        state.field_errors.remove(&key);
                    }
                }
            }
        }
        Action::ReplaceError(errors) => state.field_errors = errors,
        Action::Reset => *state = WizardState::default(),
        Action::SetSubmitting(submitting) => state.submitting = submitting,
    }
}

fn merge_data(state: &mut WizardState, patch: StatePatch) {
    let StatePatch {
        subject_name,
        questions,
        question,
        notes,
        current_step,
        step_completion,
        step_complete,
        exam_id,
    } = patch;

    if let Some(subject_name) = subject_name {
        state.subject_name = subject_name;
    }
    if let Some(questions) = questions {
        state.questions = questions;
    }
    if let Some((step, question)) = question {
        state.questions[step.get()] = question;
    }
    if let Some(notes) = notes {
        state.notes = notes;
    }
    if let Some(step) = current_step {
        state.current_step = step;
    }
    if let Some(completion) = step_completion {
        state.step_completion = completion;
    }
    if let Some((step, complete)) = step_complete {
        state.step_completion[step.get()] = complete;
    }
    if let Some(exam_id) = exam_id {
        state.exam_id = exam_id;
    }
}

// =============================================================================
// TESTS
// =============================================================================
