use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::category::{Category, CategoryError, CategoryRecord};
use crate::model::ids::CategoryId;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question bank has no categories")]
    Empty,

    #[error("category {id:?} appears more than once")]
    DuplicateCategory { id: String },

    #[error("category {id:?}: {source}")]
    InvalidCategory {
        id: String,
        #[source]
        source: CategoryError,
    },
}

/// File shape of a question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    pub categories: Vec<CategoryRecord>,
}

/// The fixed set of categories available to the quiz.
///
/// Category order is the order of the bank file; ids are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    categories: Vec<Category>,
}

impl QuestionBank {
    /// Build a bank from already validated categories.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Empty` for no categories and
    /// `BankError::DuplicateCategory` if two categories share an id.
    pub fn new(categories: Vec<Category>) -> Result<Self, BankError> {
        if categories.is_empty() {
            return Err(BankError::Empty);
        }
        for (index, category) in categories.iter().enumerate() {
            if categories[..index].iter().any(|c| c.id() == category.id()) {
                return Err(BankError::DuplicateCategory {
                    id: category.id().to_string(),
                });
            }
        }
        Ok(Self { categories })
    }

    /// Normalize a parsed bank file.
    ///
    /// # Errors
    ///
    /// Returns `BankError::InvalidCategory` for the first category that fails
    /// validation, or the errors of [`QuestionBank::new`].
    pub fn from_record(record: BankRecord) -> Result<Self, BankError> {
        let categories = record
            .categories
            .into_iter()
            .map(|c| {
                let id = c.id.clone();
                Category::from_record(c).map_err(|source| BankError::InvalidCategory { id, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(categories)
    }

    /// Parse and validate a bank from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` for malformed JSON, otherwise see
    /// [`QuestionBank::from_record`].
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let record: BankRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &CategoryId) -> bool {
        self.category(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK: &str = r#"{
        "categories": [
            {
                "id": "part1",
                "displayName": "Part 1",
                "displayNameLocalized": "بخش اول",
                "icon": "1",
                "color": "blue",
                "questions": [
                    { "question": "Q1", "options": ["A", "B"], "correctAnswer": "A" },
                    { "question": "Q2", "options": ["A", "B"], "correctAnswer": "B" }
                ]
            },
            {
                "id": "part2",
                "displayName": "Part 2",
                "questions": [
                    { "question": "Q1", "options": ["yes", "no"], "answer": "no" }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_bank_with_mixed_answer_fields() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        assert_eq!(bank.categories().len(), 2);

        let part2 = bank.category(&"part2".parse().unwrap()).unwrap();
        assert_eq!(part2.questions()[0].correct_answer(), "no");
        assert_eq!(part2.display_name_localized(), None);
    }

    #[test]
    fn keeps_file_order() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        let ids: Vec<_> = bank.categories().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["part1", "part2"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{"categories":[
            {"id":"a","displayName":"A","questions":[{"question":"Q","options":["x","y"],"answer":"x"}]},
            {"id":"a","displayName":"A again","questions":[{"question":"Q","options":["x","y"],"answer":"y"}]}
        ]}"#;
        let err = QuestionBank::from_json(json).unwrap_err();
        assert!(matches!(err, BankError::DuplicateCategory { ref id } if id == "a"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            QuestionBank::from_json("{ not json").unwrap_err(),
            BankError::Parse(_)
        ));
    }

    #[test]
    fn rejects_empty_bank() {
        assert!(matches!(
            QuestionBank::from_json(r#"{"categories":[]}"#).unwrap_err(),
            BankError::Empty
        ));
    }
}
