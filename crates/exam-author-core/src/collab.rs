//! # Collaborators
//!
//! The interfaces the engine consumes but never implements itself: where the
//! auth token comes from and who persists a finished exam. Concrete
//! implementations (cookie jar, HTTP client) live in the application crate.

use crate::primitives::ExamId;
use crate::state::ExamPayload;
use std::future::Future;

// =============================================================================
// TOKEN PROVIDER
// =============================================================================

/// Source of the current auth token.
pub trait TokenProvider {
    /// The opaque token, or `None` when the author is not signed in.
    fn token(&self) -> Option<String>;
}

/// A token fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// No token.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for &T {
    fn token(&self) -> Option<String> {
        (**self).token()
    }
}

// =============================================================================
// EXAM SUBMITTER
// =============================================================================

/// Everything the create/update collaborator needs besides the callback.
#[derive(Debug, Clone, Copy)]
pub struct SaveRequest<'a> {
    pub payload: &'a ExamPayload,
    /// `Some` for an update, `None` for a create.
    pub exam_id: Option<&'a ExamId>,
    pub token: Option<&'a str>,
}

impl SaveRequest<'_> {
    pub fn is_update(&self) -> bool {
        self.exam_id.is_some()
    }
}

/// Callback run by the collaborator once the exam has been saved
/// (typically navigation away from the form).
pub type OnSaved = Box<dyn FnOnce() + Send>;

/// Persists a finished exam.
///
/// On success the implementation must call `on_saved`; on failure it returns
/// its own error and is responsible for telling the author.
pub trait ExamSubmitter {
    type Error: std::error::Error + Send + Sync + 'static;

    fn save_exam(
        &self,
        request: SaveRequest<'_>,
        on_saved: OnSaved,
    ) -> impl Future<Output = Result<(), Self::Error>>;
}

// =============================================================================
// TESTS
// =============================================================================
