//! # Exam Author Core
//!
//! The stepped exam-authoring form engine.
//!
//! An author walks through [`TOTAL_QUESTIONS`] steps, one question per step,
//! each with four options and an answer, plus a subject and two notes. The
//! engine decides what is valid, when the author may move between steps and
//! what is sent on submit. It draws nothing and performs no I/O of its own.
//!
//! ```text
//! input ─► Binding ─► WizardController ─► Action ─► FormStateStore
//!                           │                            │
//!                    validation rules              subscribers
//!                           │                            │
//!                    ExamSubmitter ◄─ submit     FieldDescriptorBuilder ─► renderer
//! ```
//!
//! ## Modules
//!
//! - [`store`]: state owner, closed action set, subscriptions
//! - [`validation`]: pure field and cross-entry rules
//! - [`controller`]: step validation, navigation, live edits, submit, reset
//! - [`fields`]: renderer-agnostic descriptor projection
//! - [`collab`]: token and create/update collaborator interfaces

pub mod collab;
pub mod controller;
pub mod error;
pub mod fields;
pub mod primitives;
pub mod state;
pub mod store;
pub mod validation;

pub use collab::{ExamSubmitter, OnSaved, SaveRequest, StaticToken, TokenProvider};
pub use controller::{Direction, SubmitOutcome, WizardController};
pub use error::{FieldError, SubmitError, ValidationReport};
pub use fields::{
    Binding, Bindings, ControlKind, FieldDescriptor, FieldDescriptorBuilder, FieldInput,
    HandlerTable, describe,
};
pub use primitives::{ExamId, NOTE_COUNT, OPTIONS_PER_QUESTION, StepIndex, TOTAL_QUESTIONS};
pub use state::{ErrorKey, ExamPayload, FieldErrors, FieldId, Question, WizardState};
pub use store::{Action, ErrorPatch, FormStateStore, StatePatch, SubscriptionId};
pub use validation::{FieldValidator, RequiredFields};
