//! # Field Descriptors
//!
//! Projects a [`WizardState`] into the ordered list of controls a renderer
//! should draw. The projection is pure: it never mutates state, and the same
//! state and handler table always yield the same list.
//!
//! Handlers are injected through a [`HandlerTable`]. The default table,
//! [`Bindings`], yields plain [`Binding`] values which a renderer passes back
//! to [`WizardController::handle`](crate::controller::WizardController::handle).

use crate::primitives::{NOTE_COUNT, OPTIONS_PER_QUESTION};
use crate::state::{FieldId, WizardState};
use serde::Serialize;

// =============================================================================
// CONTROL KINDS
// =============================================================================

/// What kind of control to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ControlKind {
    TextInput,
    /// Radio-equivalent: exactly one of `choices` may be selected.
    SingleSelect { choices: Vec<String> },
    Button { disabled: bool },
}

// =============================================================================
// HANDLERS
// =============================================================================

/// The controller operation a control triggers. Edits apply to the current
/// step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "op", content = "index", rename_all = "kebab-case")]
pub enum Binding {
    Subject,
    QuestionText,
    Option(usize),
    Answer,
    Previous,
    Next,
    Note(usize),
}

/// User input delivered to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// New value of a text input or selector.
    Change(String),
    Click,
}

/// Maps each [`Binding`] to whatever handler type a renderer wants attached
/// to its controls.
pub trait HandlerTable {
    type Handler: Clone;

    fn bind(&self, binding: Binding) -> Self::Handler;
}

/// Identity table: the handler is the binding itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings;

impl HandlerTable for Bindings {
    type Handler = Binding;

    fn bind(&self, binding: Binding) -> Binding {
        binding
    }
}

impl<F, H> HandlerTable for F
where
    F: Fn(Binding) -> H,
    H: Clone,
{
    type Handler = H;

    fn bind(&self, binding: Binding) -> H {
        self(binding)
    }
}

// =============================================================================
// DESCRIPTOR
// =============================================================================

/// Renderer-agnostic description of one on-screen control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor<H = Binding> {
    pub id: FieldId,
    #[serde(flatten)]
    pub kind: ControlKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub handler: H,
}

impl<H> FieldDescriptor<H> {
    pub fn is_disabled(&self) -> bool {
        matches!(self.kind, ControlKind::Button { disabled: true })
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds the descriptor list for the current step.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptorBuilder<'a, T = Bindings> {
    state: &'a WizardState,
    handlers: T,
}

impl<'a> FieldDescriptorBuilder<'a> {
    pub fn new(state: &'a WizardState) -> Self {
        Self {
            state,
            handlers: Bindings,
        }
    }
}

impl<'a, T: HandlerTable> FieldDescriptorBuilder<'a, T> {
    pub fn with_handlers<U: HandlerTable>(self, handlers: U) -> FieldDescriptorBuilder<'a, U> {
        FieldDescriptorBuilder {
            state: self.state,
            handlers,
        }
    }

    fn descriptor(
        &self,
        id: FieldId,
        kind: ControlKind,
        label: impl Into<String>,
        placeholder: Option<String>,
        value: &str,
        binding: Binding,
    ) -> FieldDescriptor<T::Handler> {
        let error = id
            .error_key()
            .and_then(|key| self.state.error(key))
            .map(ToString::to_string);
        FieldDescriptor {
            id,
            kind,
            label: label.into(),
            placeholder,
            value: value.to_string(),
            error,
            handler: self.handlers.bind(binding),
        }
    }

    /// Subject, question, four options, answer, previous, next, two notes.
    pub fn build(&self) -> Vec<FieldDescriptor<T::Handler>> {
        let state = self.state;
        let step = state.current_step;
        let question = state.current_question();
        let mut fields = Vec::with_capacity(FIELD_COUNT);

        fields.push(self.descriptor(
            FieldId::Subject,
            ControlKind::TextInput,
            "Subject Name",
            Some("Subject Name".to_string()),
            &state.subject_name,
            Binding::Subject,
        ));

        fields.push(self.descriptor(
            FieldId::Question(step),
            ControlKind::TextInput,
            format!("Question: {}", step),
            Some("Enter question".to_string()),
            &question.text,
            Binding::QuestionText,
        ));

        for (position, option) in question.options.iter().enumerate() {
            fields.push(self.descriptor(
                FieldId::Option { step, position },
                ControlKind::TextInput,
                "Options",
                Some(format!("Option {}", position.saturating_add(1))),
                option,
                Binding::Option(position),
            ));
        }

        fields.push(self.descriptor(
            FieldId::Answer(step),
            ControlKind::SingleSelect {
                choices: question.answer_candidates().map(String::from).collect(),
            },
            "Answer",
            None,
            &question.answer_text,
            Binding::Answer,
        ));

        fields.push(self.descriptor(
            FieldId::Previous,
            ControlKind::Button {
                disabled: step.is_first(),
            },
            "Previous",
            None,
            "",
            Binding::Previous,
        ));

        fields.push(self.descriptor(
            FieldId::Next,
            ControlKind::Button {
                disabled: step.is_last(),
            },
            "Next",
            None,
            "",
            Binding::Next,
        ));

        for (index, note) in state.notes.iter().enumerate() {
            fields.push(self.descriptor(
                FieldId::Note(index),
                ControlKind::TextInput,
                "Notes",
                Some(format!("Note {}", index.saturating_add(1))),
                note,
                Binding::Note(index),
            ));
        }

        fields
    }
}

/// Descriptors for `state` with the default [`Bindings`] table.
pub fn describe(state: &WizardState) -> Vec<FieldDescriptor> {
    FieldDescriptorBuilder::new(state).build()
}

/// Number of descriptors every build produces.
pub const FIELD_COUNT: usize = 5 + OPTIONS_PER_QUESTION + NOTE_COUNT;

// =============================================================================
// TESTS
// =============================================================================
