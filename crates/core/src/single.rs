use std::fmt;

use crate::document::{SessionRecord, SingleDocument};
use crate::error::EngineError;
use crate::model::{Category, Question, Screen, Session};
use crate::progress::QuizProgress;
use crate::scoring::ScoreReport;
use crate::transition::{Transition, TransitionGate};

/// Single-category quiz state machine.
///
/// Same answer rules as [`crate::QuizEngine`], without category selection or
/// a way back home. Restarting discards the session entirely; callers remove
/// the stored document when [`Transition::Restart`] completes.
pub struct SingleQuizEngine {
    category: Category,
    screen: Screen,
    session: Session,
    gate: TransitionGate,
}

impl SingleQuizEngine {
    #[must_use]
    pub fn new(category: Category) -> Self {
        Self {
            category,
            screen: Screen::Home,
            session: Session::new(),
            gate: TransitionGate::default(),
        }
    }

    /// Rehydrate from a decoded document, fitting the session to the category.
    #[must_use]
    pub fn from_document(category: Category, document: SingleDocument) -> Self {
        let mut session = document.session.into_session();
        if session.sanitize(&category) {
            tracing::warn!(category = %category.id(), "stored session did not fit its category; repaired");
        }
        Self {
            category,
            screen: document.screen,
            session,
            gate: TransitionGate::default(),
        }
    }

    #[must_use]
    pub fn to_document(&self) -> SingleDocument {
        SingleDocument {
            screen: self.screen,
            session: SessionRecord::from_session(&self.session),
        }
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    #[must_use]
    pub fn pending_transition(&self) -> Option<&Transition> {
        self.gate.pending()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.category.question(self.session.current_question())
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(&self.category, &self.session)
    }

    #[must_use]
    pub fn score_report(&self) -> ScoreReport {
        ScoreReport::new(&self.category, self.session.answers())
    }

    /// # Errors
    ///
    /// Returns `EngineError::InvalidSelection` if the option does not belong to
    /// the current question.
    pub fn select_option(&mut self, option: &str) -> Result<bool, EngineError> {
        if !self.accepts_answer_intents() {
            return Ok(false);
        }
        self.session.select(&self.category, option)
    }

    pub fn next_question(&mut self) -> bool {
        self.accepts_answer_intents() && self.session.next(&self.category)
    }

    pub fn prev_question(&mut self) -> bool {
        self.accepts_answer_intents() && self.session.prev()
    }

    pub fn request_start(&mut self) -> bool {
        if self.is_busy() || self.screen != Screen::Home {
            return false;
        }
        self.gate.begin(Transition::Start)
    }

    pub fn request_finish(&mut self) -> bool {
        self.accepts_answer_intents()
            && self.session.can_finish(&self.category)
            && self.gate.begin(Transition::Finish)
    }

    pub fn request_restart(&mut self) -> bool {
        if self.is_busy() || self.screen != Screen::Results {
            return false;
        }
        self.gate.begin(Transition::Restart)
    }

    /// Apply the pending transition and clear `busy`.
    pub fn complete_transition(&mut self) -> Option<Transition> {
        let transition = self.gate.take()?;
        match &transition {
            Transition::Start => self.screen = Screen::Quiz,
            Transition::Finish => {
                self.session.commit_selection();
                self.screen = Screen::Results;
            }
            Transition::Restart => {
                self.session.reset();
                self.screen = Screen::Quiz;
            }
            Transition::OpenCategory(_) | Transition::Home => {}
        }
        tracing::debug!(?transition, screen = %self.screen, "transition applied");
        Some(transition)
    }

    pub fn start_quiz(&mut self) -> bool {
        self.request_start() && self.complete_transition().is_some()
    }

    pub fn finish_quiz(&mut self) -> bool {
        self.request_finish() && self.complete_transition().is_some()
    }

    pub fn restart_quiz(&mut self) -> bool {
        self.request_restart() && self.complete_transition().is_some()
    }

    fn accepts_answer_intents(&self) -> bool {
        !self.is_busy() && self.screen == Screen::Quiz
    }
}

impl fmt::Debug for SingleQuizEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleQuizEngine")
            .field("category", self.category.id())
            .field("screen", &self.screen)
            .field("session", &self.session)
            .field("busy", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerRecord, CategoryId};

    fn category() -> Category {
        let questions = ["A", "B"]
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                Question::new(format!("Q{i}"), vec!["A".into(), "B".into()], *answer).unwrap()
            })
            .collect();
        Category::new(CategoryId::new("default").unwrap(), "Quiz", questions).unwrap()
    }

    #[test]
    fn full_run_reaches_results() {
        let mut engine = SingleQuizEngine::new(category());
        assert!(!engine.select_option("A").unwrap(), "ignored on home");
        assert!(engine.start_quiz());
        engine.select_option("A").unwrap();
        engine.next_question();
        engine.select_option("A").unwrap();
        assert!(engine.finish_quiz());

        assert_eq!(engine.screen(), Screen::Results);
        let report = engine.score_report();
        assert_eq!(report.score, 1);
        assert_eq!(report.percentage, 50);
    }

    #[test]
    fn restart_resets_session() {
        let mut engine = SingleQuizEngine::new(category());
        engine.start_quiz();
        engine.select_option("A").unwrap();
        engine.next_question();
        engine.select_option("B").unwrap();
        engine.finish_quiz();

        assert!(engine.request_restart());
        assert!(engine.is_busy());
        assert_eq!(engine.complete_transition(), Some(Transition::Restart));
        assert_eq!(engine.screen(), Screen::Quiz);
        assert_eq!(engine.session(), &Session::new());
    }

    #[test]
    fn rehydrates_flat_document() {
        let doc = SingleDocument {
            screen: Screen::Quiz,
            session: SessionRecord {
                current_question: 1,
                user_answers: AnswerRecord::from([(0, "B".to_string())]),
                selected_option: Some("A".into()),
            },
        };
        let engine = SingleQuizEngine::from_document(category(), doc.clone());
        assert_eq!(engine.to_document(), doc);
        assert!(engine.progress().is_last);
    }
}
