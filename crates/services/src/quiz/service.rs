use std::fmt;
use std::sync::Arc;

use quiz_core::model::{CategoryId, QuestionBank};
use quiz_core::{PersistedDocument, QuizEngine, Transition};
use storage::repository::KeyValueStore;

use super::persistence::DocumentSlot;
use super::snapshot::QuizSnapshot;
use crate::error::QuizServiceError;
use crate::settings::QuizSettings;

/// Multi-category quiz with write-through persistence.
///
/// Every intent that changes state writes the whole document back to the
/// store. Screen changes are two-phase: `begin_*` raises `busy`, and
/// [`QuizService::settle`] waits out the transition delay, applies the change,
/// and saves. The one-shot intent methods do both.
pub struct QuizService {
    engine: QuizEngine,
    slot: DocumentSlot,
    settings: QuizSettings,
}

impl QuizService {
    /// Rehydrate from the store, falling back to a fresh quiz.
    ///
    /// Never fails: an empty, damaged, or unreachable store yields defaults.
    pub async fn load(
        bank: Arc<QuestionBank>,
        store: Arc<dyn KeyValueStore>,
        settings: QuizSettings,
    ) -> Self {
        let mut slot = DocumentSlot::new(store, settings.storage_key());
        let engine = match slot.read().await {
            Some(raw) => QuizEngine::from_document(bank, PersistedDocument::decode(&raw)),
            None => QuizEngine::new(bank),
        };
        tracing::debug!(screen = %engine.screen(), "quiz state loaded");
        Self {
            engine,
            slot,
            settings,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot::from_engine(&self.engine)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.engine.is_busy()
    }

    /// True after a store operation failed and no later one succeeded.
    #[must_use]
    pub fn is_persistence_degraded(&self) -> bool {
        self.slot.is_degraded()
    }

    /// Write the current document to the store.
    pub async fn save(&mut self) {
        match self.engine.to_document().encode() {
            Ok(raw) => self.slot.write(&raw).await,
            Err(error) => tracing::warn!(%error, "failed to encode quiz state; not saved"),
        }
    }

    //
    // ─── ANSWER INTENTS ────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `QuizServiceError::Engine` if the option is not offered by the
    /// current question. State is left unchanged.
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

    /// Forget one category's saved progress. Only applies on the home screen.
    pub async fn clear_category(&mut self, id: &CategoryId) -> QuizSnapshot {
        if self.engine.clear_category(id) {
            self.save().await;
        }
        self.snapshot()
    }

    //
    // ─── SCREEN TRANSITIONS ────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `QuizServiceError::Engine` if the bank has no such category.
    pub fn begin_select_category(&mut self, id: &CategoryId) -> Result<bool, QuizServiceError> {
        Ok(self.engine.request_category(id)?)
    }

    pub fn begin_finish(&mut self) -> bool {
        self.engine.request_finish()
    }

    pub fn begin_restart(&mut self) -> bool {
        self.engine.request_restart()
    }

    pub fn begin_go_to_home(&mut self) -> bool {
        self.engine.request_home()
    }

    /// Wait out the transition delay, apply the pending transition, and save.
    ///
    /// Returns the applied transition, or `None` if nothing was pending.
    pub async fn settle(&mut self) -> Option<Transition> {
        if !self.engine.is_busy() {
            return None;
        }
        tokio::time::sleep(self.settings.transition_delay()).await;
        let transition = self.engine.complete_transition()?;
        self.save().await;
        Some(transition)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Engine` if the bank has no such category.
    pub async fn select_category(&mut self, id: &CategoryId) -> Result<QuizSnapshot, QuizServiceError> {
        if self.begin_select_category(id)? {
            self.settle().await;
        }
        Ok(self.snapshot())
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

    pub async fn go_to_home(&mut self) -> QuizSnapshot {
        if self.begin_go_to_home() {
            self.settle().await;
        }
        self.snapshot()
    }
}

impl fmt::Debug for QuizService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizService")
            .field("engine", &self.engine)
            .field("slot", &self.slot)
            .field("settings", &self.settings)
            .finish()
    }
}
