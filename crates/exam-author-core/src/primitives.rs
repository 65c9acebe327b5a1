//! # Primitives
//!
//! Shape constants and small identifier types shared by every module.
//!
//! The shape of an exam is fixed at compile time: [`TOTAL_QUESTIONS`]
//! questions, each with [`OPTIONS_PER_QUESTION`] options, and
//! [`NOTE_COUNT`] notes. Arrays of these lengths make a partially
//! populated exam unrepresentable.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SHAPE CONSTANTS
// =============================================================================

/// Number of questions in every exam.
pub const TOTAL_QUESTIONS: usize = 15;

/// Number of options offered by every question.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Number of free-text notes attached to an exam.
pub const NOTE_COUNT: usize = 2;

// =============================================================================
// STEP INDEX
// =============================================================================

/// Index of a wizard step, guaranteed to be in `0..TOTAL_QUESTIONS`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "usize", into = "usize")]
pub struct StepIndex(usize);

impl StepIndex {
    /// The first step.
    pub const FIRST: Self = Self(0);

    /// The last step.
    pub const LAST: Self = Self(TOTAL_QUESTIONS - 1);

    /// Create a step index, or `None` when out of range.
    #[must_use]
    pub fn new(index: usize) -> Option<Self> {
        (index < TOTAL_QUESTIONS).then_some(Self(index))
    }

    /// The raw zero-based index.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    /// The step before this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// The step after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::new(self.0.saturating_add(1))
    }

    pub fn is_first(self) -> bool {
        self == Self::FIRST
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    /// Iterate over every step in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..TOTAL_QUESTIONS).map(Self)
    }
}

impl TryFrom<usize> for StepIndex {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            format!(
                "step index {} out of valid range 0..{}",
                value, TOTAL_QUESTIONS
            )
        })
    }
}

impl From<StepIndex> for usize {
    fn from(step: StepIndex) -> Self {
        step.0
    }
}

impl fmt::Display for StepIndex {
    /// One-based, as shown to authors: `3 / 15`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.0.saturating_add(1), TOTAL_QUESTIONS)
    }
}

// =============================================================================
// EXAM ID
// =============================================================================

/// Server-assigned identifier of an existing exam.
///
/// Opaque to the engine; only its presence matters (edit vs create).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamId(pub String);

impl ExamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_index_rejects_out_of_range() {
        assert!(StepIndex::new(TOTAL_QUESTIONS).is_none());
        assert_eq!(StepIndex::new(0), Some(StepIndex::FIRST));
        assert_eq!(StepIndex::new(TOTAL_QUESTIONS - 1), Some(StepIndex::LAST));
    }

    #[test]
    fn step_index_neighbours_stop_at_bounds() {
        assert_eq!(StepIndex::FIRST.previous(), None);
        assert_eq!(StepIndex::LAST.next(), None);
        assert_eq!(StepIndex::FIRST.next().map(StepIndex::get), Some(1));
        assert_eq!(StepIndex::LAST.previous().map(StepIndex::get), Some(13));
    }

    #[test]
    fn step_index_displays_one_based() {
        assert_eq!(StepIndex::FIRST.to_string(), "1 / 15");
        assert_eq!(StepIndex::LAST.to_string(), "15 / 15");
    }

    #[test]
    fn step_index_deserialization_is_checked() {
        let ok: Result<StepIndex, _> = serde_json::from_str("4");
        assert_eq!(ok.ok().map(StepIndex::get), Some(4));

        let bad: Result<StepIndex, _> = serde_json::from_str("15");
        assert!(bad.is_err());
    }

    #[test]
    fn all_steps_are_in_order() {
        let steps: Vec<usize> = StepIndex::all().map(StepIndex::get).collect();
        assert_eq!(steps.len(), TOTAL_QUESTIONS);
        assert_eq!(steps.first(), Some(&0));
        assert_eq!(steps.last(), Some(&14));
    }
}
