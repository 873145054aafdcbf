use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::model::category::Category;

/// Committed answers: question index → chosen option text.
///
/// Sparse; an index is present only once a selection was committed for it.
pub type AnswerRecord = BTreeMap<usize, String>;

/// Progress through one category.
///
/// `selected_option` is the live selection for the current question and only
/// reaches `answers` when committed by navigation or finishing. The two can
/// differ in between, e.g. after picking a new option on a question that was
/// already answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_question: usize,
    answers: AnswerRecord,
    selected_option: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a session from persisted fields without validation.
    ///
    /// Use [`Session::sanitize`] to fit it to a category afterwards.
    #[must_use]
    pub fn from_persisted(
        current_question: usize,
        answers: AnswerRecord,
        selected_option: Option<String>,
    ) -> Self {
        Self {
            current_question,
            answers,
            selected_option,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> usize {
        self.current_question
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// True when the session is still at its initial state.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.current_question == 0 && self.answers.is_empty() && self.selected_option.is_none()
    }

    /// Set the live selection for the current question.
    ///
    /// Returns whether the session changed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSelection` if `option` is not one of the
    /// current question's options.
    pub fn select(&mut self, category: &Category, option: &str) -> Result<bool, EngineError> {
        let valid = category
            .question(self.current_question)
            .is_some_and(|q| q.has_option(option));
        if !valid {
            return Err(EngineError::InvalidSelection {
                option: option.to_owned(),
                question: self.current_question,
            });
        }
        if self.selected_option.as_deref() == Some(option) {
            return Ok(false);
        }
        self.selected_option = Some(option.to_owned());
        Ok(true)
    }

    /// Write the live selection into `answers` for the current question.
    ///
    /// Returns whether `answers` changed.
    pub fn commit_selection(&mut self) -> bool {
        let Some(selected) = self.selected_option.clone() else {
            return false;
        };
        match self.answers.insert(self.current_question, selected.clone()) {
            Some(previous) => previous != selected,
            None => true,
        }
    }

    /// Commit and move forward one question.
    ///
    /// Without a selection nothing happens. On the last question the answer is
    /// committed and the index stays put.
    pub fn next(&mut self, category: &Category) -> bool {
        if self.selected_option.is_none() {
            return false;
        }
        let before = self.clone();
        self.commit_selection();
        if self.current_question < category.last_index() {
            self.current_question += 1;
        }
        self.restore_selection();
        *self != before
    }

    /// Commit a selection if present and move back one question.
    ///
    /// No-op on the first question.
    pub fn prev(&mut self) -> bool {
        if self.current_question == 0 {
            return false;
        }
        self.commit_selection();
        self.current_question -= 1;
        self.restore_selection();
        true
    }

    /// Whether `finish` is allowed: last question with a live selection.
    #[must_use]
    pub fn can_finish(&self, category: &Category) -> bool {
        self.selected_option.is_some() && self.current_question == category.last_index()
    }

    /// Back to the first question with no answers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fit a rehydrated session to its category.
    ///
    /// Clamps an out-of-range index, drops answers for indices or options the
    /// category does not have, and drops a selection that is not an option of
    /// the current question. Returns whether anything was changed.
    pub fn sanitize(&mut self, category: &Category) -> bool {
        let before = self.clone();
        if self.current_question > category.last_index() {
            self.current_question = category.last_index();
        }
        self.answers.retain(|index, option| {
            category
                .question(*index)
                .is_some_and(|q| q.has_option(option))
        });
        let selection_valid = match (&self.selected_option, category.question(self.current_question)) {
            (Some(option), Some(question)) => question.has_option(option),
            _ => true,
        };
        if !selection_valid {
            self.selected_option = None;
        }
        *self != before
    }

    fn restore_selection(&mut self) {
        self.selected_option = self.answers.get(&self.current_question).cloned();
    }
}
