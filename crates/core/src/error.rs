use thiserror::Error;

use crate::model::CategoryId;

/// Intent errors surfaced by the quiz engines.
///
/// Intents that are merely not applicable (navigating without a selection,
/// finishing early, anything while a transition is in flight) are silent
/// no-ops rather than errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("option {option:?} is not offered by question {question}")]
    InvalidSelection { option: String, question: usize },

    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),
}
