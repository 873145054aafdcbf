use serde::Serialize;

use crate::model::{Category, Session};
use crate::scoring::percentage;

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    /// `position / total * 100`, rounded half-up.
    pub percent: u32,
    pub is_last: bool,
}

impl QuizProgress {
    #[must_use]
    pub fn new(category: &Category, session: &Session) -> Self {
        let total = category.len();
        let position = session.current_question() + 1;
        Self {
            position,
            total,
            answered: session.answered_count(),
            percent: percentage(position, total),
            is_last: session.current_question() == category.last_index(),
        }
    }

    /// Label such as `"3 of 10"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} of {}", self.position, self.total)
    }
}
