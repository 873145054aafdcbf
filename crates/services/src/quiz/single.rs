use std::fmt;
use std::sync::Arc;

use quiz_core::model::Category;
use quiz_core::{SingleDocument, SingleQuizEngine, Transition};
use storage::repository::KeyValueStore;

use super::persistence::DocumentSlot;
use super::snapshot::QuizSnapshot;
use crate::error::QuizServiceError;
use crate::settings::QuizSettings;

/// Single-category quiz with write-through persistence.
///
/// Works like [`super::QuizService`] except that a completed restart removes
/// the stored document instead of writing it.
pub struct SingleQuizService {
    engine: SingleQuizEngine,
    slot: DocumentSlot,
    settings: QuizSettings,
}

impl SingleQuizService {
    /// Rehydrate from the store, falling back to a fresh quiz.
    pub async fn load(
        category: Category,
        store: Arc<dyn KeyValueStore>,
        settings: QuizSettings,
    ) -> Self {
        let mut slot = DocumentSlot::new(store, settings.storage_key());
        let engine = match slot.read().await {
            Some(raw) => SingleQuizEngine::from_document(category, SingleDocument::decode(&raw)),
            None => SingleQuizEngine::new(category),
        };
        Self {
            engine,
            slot,
            settings,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &SingleQuizEngine {
        &self.engine
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot::from_single(&self.engine)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.engine.is_busy()
    }

    #[must_use]
    pub fn is_persistence_degraded(&self) -> bool {
        self.slot.is_degraded()
    }

    pub async fn save(&mut self) {
        match self.engine.to_document().encode() {
            Ok(raw) => self.slot.write(&raw).await,
            Err(error) => tracing::warn!(%error, "failed to encode quiz state; not saved"),
        }
    }

    /// Remove the stored document.
    pub async fn clear(&mut self) {
        self.slot.clear().await;
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Engine` if the option is not offered by the
    /// current question.
    pub async fn select_option(&mut self, option: &str) -> Result<QuizSnapshot, QuizServiceError> {
        if self.engine.select_option(option)? {
            self.save().await;
        }
        Ok(self.snapshot())
    }

    pub async fn next_question(&mut self) -> QuizSnapshot {
        if self.engine.next_question() {
            self.save().await;
        }
        self.snapshot()
    }

    pub async fn prev_question(&mut self) -> QuizSnapshot {
        if self.engine.prev_question() {
            self.save().await;
        }
        self.snapshot()
    }

    pub fn begin_start(&mut self) -> bool {
        self.engine.request_start()
    }

    pub fn begin_finish(&mut self) -> bool {
        self.engine.request_finish()
    }

    pub fn begin_restart(&mut self) -> bool {
        self.engine.request_restart()
    }

    /// Wait out the transition delay and apply the pending transition.
    ///
    /// A restart clears the store; every other transition saves.
    pub async fn settle(&mut self) -> Option<Transition> {
        if !self.engine.is_busy() {
            return None;
        }
        tokio::time::sleep(self.settings.transition_delay()).await;
        let transition = self.engine.complete_transition()?;
        if transition == Transition::Restart {
            self.clear().await;
        } else {
            self.save().await;
        }
        Some(transition)
    }

    pub async fn start_quiz(&mut self) -> QuizSnapshot {
        if self.begin_start() {
            self.settle().await;
        }
        self.snapshot()
    }

    pub async fn finish_quiz(&mut self) -> QuizSnapshot {
        if self.begin_finish() {
            self.settle().await;
        }
        self.snapshot()
    }

    pub async fn restart_quiz(&mut self) -> QuizSnapshot {
        if self.begin_restart() {
            self.settle().await;
        }
        self.snapshot()
    }
}

impl fmt::Debug for SingleQuizService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleQuizService")
            .field("engine", &self.engine)
            .field("slot", &self.slot)
            .field("settings", &self.settings)
            .finish()
    }
}
