use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::document::{CurrentView, PersistedDocument, SessionRecord};
use crate::error::EngineError;
use crate::model::{Category, CategoryId, Question, QuestionBank, Screen, Session};
use crate::progress::QuizProgress;
use crate::scoring::ScoreReport;
use crate::transition::{Transition, TransitionGate};

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

/// Home screen entry for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOverview {
    pub id: CategoryId,
    pub display_name: String,
    pub display_name_localized: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub total: usize,
    pub answered: usize,
    pub has_progress: bool,
    /// Every question has a committed answer.
    pub completed: bool,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

/// Multi-category quiz state machine.
///
/// Owns the screen, the open category, and one [`Session`] per category that
/// has been opened. Sessions survive switching categories and going home; only
/// restart and [`QuizEngine::clear_category`] discard progress.
///
/// Every intent is ignored while a screen transition is pending.
pub struct QuizEngine {
    bank: Arc<QuestionBank>,
    screen: Screen,
    active: Option<CategoryId>,
    sessions: BTreeMap<CategoryId, Session>,
    gate: TransitionGate,
}

impl QuizEngine {
    /// Fresh engine on the home screen with no saved progress.
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            screen: Screen::Home,
            active: None,
            sessions: BTreeMap::new(),
            gate: TransitionGate::default(),
        }
    }

    /// Rehydrate from a decoded document.
    ///
    /// Sessions are fitted to their categories. Sessions for categories the
    /// bank no longer has are kept as-is so they survive the next save. A
    /// quiz or results view whose category is missing falls back to home.
    #[must_use]
    pub fn from_document(bank: Arc<QuestionBank>, document: PersistedDocument) -> Self {
        let mut sessions = BTreeMap::new();
        for (id, record) in document.categories {
            let mut session = record.into_session();
            if let Some(category) = bank.category(&id) {
                if session.sanitize(category) {
                    tracing::warn!(category = %id, "stored session did not fit its category; repaired");
                }
            }
            sessions.insert(id, session);
        }

        let CurrentView {
            screen,
            selected_category,
        } = document.current_view;

        let (screen, active) = match (screen, selected_category) {
            (Screen::Home, _) => (Screen::Home, None),
            (screen, Some(id)) if bank.contains(&id) => {
                sessions.entry(id.clone()).or_default();
                (screen, Some(id))
            }
            (screen, id) => {
                tracing::warn!(%screen, category = ?id, "stored view has no usable category; returning home");
                (Screen::Home, None)
            }
        };

        Self {
            bank,
            screen,
            active,
            sessions,
            gate: TransitionGate::default(),
        }
    }

    /// Snapshot the persisted state.
    #[must_use]
    pub fn to_document(&self) -> PersistedDocument {
        PersistedDocument {
            current_view: CurrentView {
                screen: self.screen,
                selected_category: self.active.clone(),
            },
            categories: self
                .sessions
                .iter()
                .map(|(id, session)| (id.clone(), SessionRecord::from_session(session)))
                .collect(),
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// True while a screen transition is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    #[must_use]
    pub fn pending_transition(&self) -> Option<&Transition> {
        self.gate.pending()
    }

    #[must_use]
    pub fn active_category(&self) -> Option<&Category> {
        self.active.as_ref().and_then(|id| self.bank.category(id))
    }

    #[must_use]
    pub fn active_session(&self) -> Option<&Session> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    /// Saved session for any category, if it has been opened before.
    #[must_use]
    pub fn session(&self, id: &CategoryId) -> Option<&Session> {
        self.sessions.get(id)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let (category, session) = self.active_parts()?;
        category.question(session.current_question())
    }

    #[must_use]
    pub fn progress(&self) -> Option<QuizProgress> {
        let (category, session) = self.active_parts()?;
        Some(QuizProgress::new(category, session))
    }

    /// Score of the open category.
    #[must_use]
    pub fn score_report(&self) -> Option<ScoreReport> {
        let (category, session) = self.active_parts()?;
        Some(ScoreReport::new(category, session.answers()))
    }

    #[must_use]
    pub fn overview(&self) -> Vec<CategoryOverview> {
        self.bank
            .categories()
            .iter()
            .map(|category| {
                let session = self.sessions.get(category.id());
                CategoryOverview {
                    id: category.id().clone(),
                    display_name: category.display_name().to_owned(),
                    display_name_localized: category.display_name_localized().map(str::to_owned),
                    icon: category.icon().map(str::to_owned),
                    color: category.color().map(str::to_owned),
                    total: category.len(),
                    answered: session.map_or(0, Session::answered_count),
                    has_progress: session.is_some_and(|s| !s.is_pristine()),
                    completed: session.is_some_and(|s| s.answered_count() == category.len()),
                }
            })
            .collect()
    }

    //
    // ─── ANSWER INTENTS ────────────────────────────────────────────────────────
    //

    /// Select an option for the current question. Returns whether state changed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSelection` if the option does not belong to
    /// the current question.
    pub fn select_option(&mut self, option: &str) -> Result<bool, EngineError> {
        if !self.accepts_answer_intents() {
            return Ok(false);
        }
        let Some((category, session)) = self.active_parts_mut() else {
            return Ok(false);
        };
        session.select(category, option)
    }

    /// Commit the selection and advance. Returns whether state changed.
    pub fn next_question(&mut self) -> bool {
        if !self.accepts_answer_intents() {
            return false;
        }
        self.active_parts_mut()
            .is_some_and(|(category, session)| session.next(category))
    }

    /// Commit any selection and step back. Returns whether state changed.
    pub fn prev_question(&mut self) -> bool {
        if !self.accepts_answer_intents() {
            return false;
        }
        self.active_parts_mut()
            .is_some_and(|(_, session)| session.prev())
    }

    //
    // ─── SCREEN TRANSITIONS ────────────────────────────────────────────────────
    //

    /// Request opening `id` from the home screen.
    ///
    /// Returns whether a transition is now pending.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownCategory` if the bank has no such category.
    pub fn request_category(&mut self, id: &CategoryId) -> Result<bool, EngineError> {
        if self.is_busy() || self.screen != Screen::Home {
            return Ok(false);
        }
        if !self.bank.contains(id) {
            return Err(EngineError::UnknownCategory(id.clone()));
        }
        Ok(self.gate.begin(Transition::OpenCategory(id.clone())))
    }

    /// Request the results screen. Needs the last question and a selection.
    pub fn request_finish(&mut self) -> bool {
        if !self.accepts_answer_intents() {
            return false;
        }
        let ready = self
            .active_parts()
            .is_some_and(|(category, session)| session.can_finish(category));
        ready && self.gate.begin(Transition::Finish)
    }

    /// Request a restart of the open category from the results screen.
    pub fn request_restart(&mut self) -> bool {
        if self.is_busy() || self.screen != Screen::Results {
            return false;
        }
        self.gate.begin(Transition::Restart)
    }

    /// Request the home screen from a quiz or its results.
    pub fn request_home(&mut self) -> bool {
        if self.is_busy() || self.screen == Screen::Home {
            return false;
        }
        self.gate.begin(Transition::Home)
    }

    /// Apply the pending transition and clear `busy`.
    ///
    /// Returns the applied transition, or `None` if nothing was pending.
    pub fn complete_transition(&mut self) -> Option<Transition> {
        let transition = self.gate.take()?;
        match &transition {
            Transition::OpenCategory(id) => {
                self.sessions.entry(id.clone()).or_default();
                self.active = Some(id.clone());
                self.screen = Screen::Quiz;
            }
            Transition::Finish => {
                if let Some((_, session)) = self.active_parts_mut() {
                    session.commit_selection();
                }
                self.screen = Screen::Results;
            }
            Transition::Restart => {
                if let Some((_, session)) = self.active_parts_mut() {
                    session.reset();
                }
                self.screen = Screen::Quiz;
            }
            Transition::Home => {
                self.active = None;
                self.screen = Screen::Home;
            }
            Transition::Start => {}
        }
        tracing::debug!(?transition, screen = %self.screen, "transition applied");
        Some(transition)
    }

    /// Open a category without waiting out the transition delay.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownCategory` if the bank has no such category.
    pub fn select_category(&mut self, id: &CategoryId) -> Result<bool, EngineError> {
        Ok(self.request_category(id)? && self.complete_transition().is_some())
    }

    /// Finish without waiting out the transition delay.
    pub fn finish_quiz(&mut self) -> bool {
        self.request_finish() && self.complete_transition().is_some()
    }

    /// Restart without waiting out the transition delay.
    pub fn restart_quiz(&mut self) -> bool {
        self.request_restart() && self.complete_transition().is_some()
    }

    /// Go home without waiting out the transition delay.
    pub fn go_to_home(&mut self) -> bool {
        self.request_home() && self.complete_transition().is_some()
    }

    /// Forget saved progress for one category.
    ///
    /// Only allowed from the home screen so the open session is never pulled
    /// out from under the quiz. Returns whether an entry was removed.
    pub fn clear_category(&mut self, id: &CategoryId) -> bool {
        if self.is_busy() || self.screen != Screen::Home {
            return false;
        }
        self.sessions.remove(id).is_some()
    }

    //
    // ─── HELPERS ───────────────────────────────────────────────────────────────
    //

    fn accepts_answer_intents(&self) -> bool {
        !self.is_busy() && self.screen == Screen::Quiz
    }

    fn active_parts(&self) -> Option<(&Category, &Session)> {
        let id = self.active.as_ref()?;
        Some((self.bank.category(id)?, self.sessions.get(id)?))
    }

    fn active_parts_mut(&mut self) -> Option<(&Category, &mut Session)> {
        let id = self.active.as_ref()?;
        Some((self.bank.category(id)?, self.sessions.get_mut(id)?))
    }
}

impl fmt::Debug for QuizEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizEngine")
            .field("categories_len", &self.bank.categories().len())
            .field("screen", &self.screen)
            .field("active", &self.active)
            .field("sessions_len", &self.sessions.len())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::GradeBand;
    use pretty_assertions::assert_eq;

    fn question(i: usize, answer: &str) -> Question {
        Question::new(
            format!("Q{i}"),
            vec!["A".into(), "B".into(), "C".into(), "X".into()],
            answer,
        )
        .unwrap()
    }

    fn bank() -> Arc<QuestionBank> {
        let part1 = Category::new(
            CategoryId::new("part1").unwrap(),
            "Part 1",
            vec![question(0, "A"), question(1, "B"), question(2, "C")],
        )
        .unwrap();
        let part2 = Category::new(
            CategoryId::new("part2").unwrap(),
            "Part 2",
            (0..5).map(|i| question(i, "A")).collect(),
        )
        .unwrap();
        Arc::new(QuestionBank::new(vec![part1, part2]).unwrap())
    }

    fn id(s: &str) -> CategoryId {
        CategoryId::new(s).unwrap()
    }

    fn answer(engine: &mut QuizEngine, option: &str) {
        engine.select_option(option).unwrap();
        engine.next_question();
    }

    #[test]
    fn starts_home_with_nothing_open() {
        let engine = QuizEngine::new(bank());
        assert_eq!(engine.screen(), Screen::Home);
        assert!(engine.active_category().is_none());
        assert!(!engine.is_busy());
    }

    #[test]
    fn opening_category_raises_busy_until_completed() {
        let mut engine = QuizEngine::new(bank());
        assert!(engine.request_category(&id("part1")).unwrap());
        assert!(engine.is_busy());
        assert_eq!(engine.screen(), Screen::Home);

        assert_eq!(
            engine.complete_transition(),
            Some(Transition::OpenCategory(id("part1")))
        );
        assert!(!engine.is_busy());
        assert_eq!(engine.screen(), Screen::Quiz);
        assert_eq!(engine.active_session(), Some(&Session::new()));
    }

    #[test]
    fn unknown_category_is_an_error() {
        let mut engine = QuizEngine::new(bank());
        let err = engine.select_category(&id("nope")).unwrap_err();
        assert_eq!(err, EngineError::UnknownCategory(id("nope")));
        assert_eq!(engine.screen(), Screen::Home);
    }

    #[test]
    fn intents_are_ignored_while_busy() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part1")).unwrap();
        engine.select_option("A").unwrap();
        assert!(engine.request_home());

        let before = engine.to_document();
        assert!(!engine.select_option("B").unwrap());
        assert!(!engine.next_question());
        assert!(!engine.prev_question());
        assert!(!engine.request_finish());
        assert!(!engine.request_home());
        assert_eq!(engine.to_document(), before);

        assert_eq!(engine.complete_transition(), Some(Transition::Home));
        assert_eq!(engine.complete_transition(), None);
    }

    #[test]
    fn finish_requires_last_question_and_selection() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part1")).unwrap();
        engine.select_option("A").unwrap();
        assert!(!engine.finish_quiz(), "not on the last question");

        engine.next_question();
        answer(&mut engine, "X");
        assert_eq!(engine.active_session().unwrap().current_question(), 2);
        assert_eq!(engine.active_session().unwrap().selected_option(), None);
        assert!(!engine.finish_quiz(), "no selection");
        assert_eq!(engine.screen(), Screen::Quiz);

        engine.select_option("C").unwrap();
        assert!(engine.finish_quiz());
        assert_eq!(engine.screen(), Screen::Results);
        assert_eq!(engine.active_session().unwrap().answer(2), Some("C"));
    }

    #[test]
    fn scenario_scores_two_of_three() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part1")).unwrap();
        answer(&mut engine, "A");
        answer(&mut engine, "X");
        engine.select_option("C").unwrap();
        assert!(engine.finish_quiz());

        let report = engine.score_report().unwrap();
        assert_eq!(report.score, 2);
        assert_eq!(report.percentage, 67);
        assert_eq!(report.grade, GradeBand::Good);
    }

    #[test]
    fn next_then_prev_returns_to_same_question() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part2")).unwrap();
        answer(&mut engine, "A");
        engine.select_option("B").unwrap();

        assert!(engine.next_question());
        assert!(engine.prev_question());

        let session = engine.active_session().unwrap();
        assert_eq!(session.current_question(), 1);
        assert_eq!(session.selected_option(), Some("B"));
        assert_eq!(session.answer(1), Some("B"));
    }

    #[test]
    fn prev_on_first_question_changes_nothing() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part1")).unwrap();
        engine.select_option("B").unwrap();
        let before = engine.to_document();
        assert!(!engine.prev_question());
        assert_eq!(engine.to_document(), before);
    }

    #[test]
    fn switching_categories_preserves_progress() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part2")).unwrap();
        answer(&mut engine, "A");
        answer(&mut engine, "B");
        engine.select_option("C").unwrap();
        let saved = engine.active_session().unwrap().clone();

        assert!(engine.go_to_home());
        engine.select_category(&id("part1")).unwrap();
        answer(&mut engine, "A");
        assert!(engine.go_to_home());
        engine.select_category(&id("part2")).unwrap();

        assert_eq!(engine.active_session(), Some(&saved));
        assert_eq!(saved.current_question(), 2);
        assert_eq!(saved.selected_option(), Some("C"));
    }

    #[test]
    fn restart_clears_only_the_open_category() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part2")).unwrap();
        answer(&mut engine, "A");
        engine.go_to_home();

        engine.select_category(&id("part1")).unwrap();
        answer(&mut engine, "A");
        answer(&mut engine, "B");
        engine.select_option("C").unwrap();
        engine.finish_quiz();
        assert!(engine.restart_quiz());

        assert_eq!(engine.screen(), Screen::Quiz);
        assert_eq!(engine.active_session(), Some(&Session::new()));
        assert!(engine.to_document().categories.contains_key(&id("part1")));
        assert_eq!(engine.session(&id("part2")).unwrap().answered_count(), 1);
    }

    #[test]
    fn restart_only_from_results() {
        let mut engine = QuizEngine::new(bank());
        assert!(!engine.restart_quiz());
        engine.select_category(&id("part1")).unwrap();
        assert!(!engine.restart_quiz());
    }

    #[test]
    fn clear_category_only_from_home() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part1")).unwrap();
        answer(&mut engine, "A");
        assert!(!engine.clear_category(&id("part1")));

        engine.go_to_home();
        assert!(engine.clear_category(&id("part1")));
        assert!(engine.session(&id("part1")).is_none());
        assert!(!engine.clear_category(&id("part1")));
    }

    #[test]
    fn document_round_trip_restores_state() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part2")).unwrap();
        answer(&mut engine, "A");
        engine.select_option("X").unwrap();

        let doc = engine.to_document();
        let restored = QuizEngine::from_document(bank(), doc.clone());
        assert_eq!(restored.to_document(), doc);
        assert_eq!(restored.screen(), Screen::Quiz);
        assert_eq!(restored.active_session().unwrap().selected_option(), Some("X"));
    }

    #[test]
    fn rehydration_falls_back_home_for_missing_category() {
        let doc = PersistedDocument {
            current_view: CurrentView {
                screen: Screen::Results,
                selected_category: Some(id("retired")),
            },
            categories: BTreeMap::from([(id("retired"), SessionRecord::default())]),
        };
        let engine = QuizEngine::from_document(bank(), doc);
        assert_eq!(engine.screen(), Screen::Home);
        assert!(engine.session(&id("retired")).is_some());
    }

    #[test]
    fn rehydration_repairs_out_of_range_sessions() {
        let doc = PersistedDocument {
            current_view: CurrentView {
                screen: Screen::Quiz,
                selected_category: Some(id("part1")),
            },
            categories: BTreeMap::from([(
                id("part1"),
                SessionRecord {
                    current_question: 42,
                    user_answers: [(0, "A".to_string()), (9, "A".to_string())].into(),
                    selected_option: None,
                },
            )]),
        };
        let engine = QuizEngine::from_document(bank(), doc);
        let session = engine.active_session().unwrap();
        assert_eq!(session.current_question(), 2);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn overview_reports_saved_progress() {
        let mut engine = QuizEngine::new(bank());
        engine.select_category(&id("part2")).unwrap();
        answer(&mut engine, "A");
        engine.go_to_home();

        let overview = engine.overview();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].id, id("part1"));
        assert!(!overview[0].has_progress);
        assert_eq!(overview[1].answered, 1);
        assert_eq!(overview[1].total, 5);
        assert!(overview[1].has_progress);
        assert!(!overview[1].completed);
    }
}
