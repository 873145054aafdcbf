use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CategoryId;
use crate::model::question::{Question, QuestionError, QuestionRecord};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category id cannot be empty")]
    EmptyId,

    #[error("category display name cannot be empty")]
    EmptyName,

    #[error("category has no questions")]
    NoQuestions,

    #[error("question {index}: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

//
// ─── RAW RECORD ────────────────────────────────────────────────────────────────
//

/// Category shape as it appears in question bank files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub display_name_localized: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub questions: Vec<QuestionRecord>,
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A named, ordered question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    display_name: String,
    display_name_localized: Option<String>,
    icon: Option<String>,
    color: Option<String>,
    questions: Vec<Question>,
}

impl Category {
    /// Creates a category holding at least one question.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` or `CategoryError::NoQuestions`.
    pub fn new(
        id: CategoryId,
        display_name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, CategoryError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if questions.is_empty() {
            return Err(CategoryError::NoQuestions);
        }
        Ok(Self {
            id,
            display_name,
            display_name_localized: None,
            icon: None,
            color: None,
            questions,
        })
    }

    /// Validate and normalize a bank record.
    ///
    /// # Errors
    ///
    /// Returns `CategoryError` for a blank id or name, an empty question list,
    /// or the first invalid question.
    pub fn from_record(record: CategoryRecord) -> Result<Self, CategoryError> {
        let id = CategoryId::new(record.id).map_err(|_| CategoryError::EmptyId)?;
        let questions = record
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| {
                Question::from_record(q)
                    .map_err(|source| CategoryError::InvalidQuestion { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(id, record.display_name, questions)?
            .with_localized_name(record.display_name_localized)
            .with_icon(record.icon)
            .with_color(record.color))
    }

    #[must_use]
    pub fn with_localized_name(mut self, name: Option<String>) -> Self {
        self.display_name_localized = name.filter(|n| !n.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = icon;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn display_name_localized(&self) -> Option<&str> {
        self.display_name_localized.as_deref()
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions; always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(questions: Vec<QuestionRecord>) -> CategoryRecord {
        CategoryRecord {
            id: "part1".into(),
            display_name: "Part 1".into(),
            display_name_localized: Some("بخش ۱".into()),
            icon: Some("book".into()),
            color: Some("#3366ff".into()),
            questions,
        }
    }

    fn question(answer: &str) -> QuestionRecord {
        QuestionRecord {
            question: "Q".into(),
            options: vec!["A".into(), "B".into()],
            correct_answer: Some(answer.into()),
        }
    }

    #[test]
    fn builds_from_record() {
        let category = Category::from_record(record(vec![question("A"), question("B")])).unwrap();
        assert_eq!(category.id().as_str(), "part1");
        assert_eq!(category.len(), 2);
        assert_eq!(category.last_index(), 1);
        assert_eq!(category.display_name_localized(), Some("بخش ۱"));
        assert_eq!(category.icon(), Some("book"));
    }

    #[test]
    fn empty_category_is_rejected() {
        let err = Category::from_record(record(Vec::new())).unwrap_err();
        assert_eq!(err, CategoryError::NoQuestions);
    }

    #[test]
    fn reports_index_of_bad_question() {
        let err = Category::from_record(record(vec![question("A"), question("Z")])).unwrap_err();
        assert!(matches!(err, CategoryError::InvalidQuestion { index: 1, .. }));
    }
}
