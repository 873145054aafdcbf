use serde::Serialize;

use quiz_core::model::{Category, CategoryId, Screen, Session};
use quiz_core::{CategoryOverview, QuizEngine, QuizProgress, ScoreReport, SingleQuizEngine};

/// Presentation-agnostic description of the open category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryHeader {
    pub id: CategoryId,
    pub display_name: String,
    pub display_name_localized: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryHeader {
    fn new(category: &Category) -> Self {
        Self {
            id: category.id().clone(),
            display_name: category.display_name().to_owned(),
            display_name_localized: category.display_name_localized().map(str::to_owned),
            icon: category.icon().map(str::to_owned),
            color: category.color().map(str::to_owned),
        }
    }
}

/// The question on screen with the live selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub can_finish: bool,
}

impl QuestionView {
    fn new(category: &Category, session: &Session) -> Option<Self> {
        let index = session.current_question();
        let question = category.question(index)?;
        let selected = session.selected_option().map(str::to_owned);
        let is_last = index == category.last_index();
        Some(Self {
            index,
            text: question.text().to_owned(),
            options: question.options().to_vec(),
            can_go_prev: index > 0,
            can_go_next: selected.is_some() && !is_last,
            can_finish: selected.is_some() && is_last,
            selected,
        })
    }
}

/// Everything a presentation layer needs to render the current state.
///
/// Only the parts relevant to `screen` are populated: `categories` on home,
/// `question`/`progress` while quizzing, `results` on the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSnapshot {
    pub screen: Screen,
    pub busy: bool,
    pub category: Option<CategoryHeader>,
    pub question: Option<QuestionView>,
    pub progress: Option<QuizProgress>,
    pub results: Option<ScoreReport>,
    pub categories: Vec<CategoryOverview>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn from_engine(engine: &QuizEngine) -> Self {
        let screen = engine.screen();
        let parts = engine.active_category().zip(engine.active_session());
        Self::build(screen, engine.is_busy(), parts, || engine.overview())
    }

    #[must_use]
    pub fn from_single(engine: &SingleQuizEngine) -> Self {
        let parts = Some((engine.category(), engine.session()));
        Self::build(engine.screen(), engine.is_busy(), parts, Vec::new)
    }

    fn build(
        screen: Screen,
        busy: bool,
        parts: Option<(&Category, &Session)>,
        overview: impl FnOnce() -> Vec<CategoryOverview>,
    ) -> Self {
        let mut snapshot = Self {
            screen,
            busy,
            category: None,
            question: None,
            progress: None,
            results: None,
            categories: Vec::new(),
        };

        match (screen, parts) {
            (Screen::Home, parts) => {
                snapshot.category = parts.map(|(category, _)| CategoryHeader::new(category));
                snapshot.categories = overview();
            }
            (Screen::Quiz, Some((category, session))) => {
                snapshot.category = Some(CategoryHeader::new(category));
                snapshot.question = QuestionView::new(category, session);
                snapshot.progress = Some(QuizProgress::new(category, session));
            }
            (Screen::Results, Some((category, session))) => {
                snapshot.category = Some(CategoryHeader::new(category));
                snapshot.results = Some(ScoreReport::new(category, session.answers()));
            }
            (_, None) => {}
        }
        snapshot
    }
}
