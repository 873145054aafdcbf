use std::time::Duration;

use quiz_core::model::CategoryId;
use quiz_core::{DOCUMENT_KEY, SINGLE_DOCUMENT_KEY, TRANSITION_DELAY};

/// Runtime knobs for the quiz services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    storage_key: String,
    transition_delay: Duration,
}

impl QuizSettings {
    /// Defaults for the multi-category quiz.
    #[must_use]
    pub fn multi_category() -> Self {
        Self {
            storage_key: DOCUMENT_KEY.to_owned(),
            transition_delay: TRANSITION_DELAY,
        }
    }

    /// Defaults for the single-category quiz.
    #[must_use]
    pub fn single_category() -> Self {
        Self {
            storage_key: SINGLE_DOCUMENT_KEY.to_owned(),
            transition_delay: TRANSITION_DELAY,
        }
    }

    /// Single-category defaults keyed by category, so quizzes over different
    /// categories never load each other's progress.
    #[must_use]
    pub fn single_category_for(id: &CategoryId) -> Self {
        Self::single_category().with_storage_key(format!("{SINGLE_DOCUMENT_KEY}.{id}"))
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    #[must_use]
    pub fn with_transition_delay(mut self, delay: Duration) -> Self {
        self.transition_delay = delay;
        self
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    #[must_use]
    pub fn transition_delay(&self) -> Duration {
        self.transition_delay
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::multi_category()
    }
}
