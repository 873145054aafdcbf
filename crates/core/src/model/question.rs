use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("option {option:?} appears more than once")]
    DuplicateOption { option: String },

    #[error("correct answer {answer:?} is not one of the options")]
    AnswerNotInOptions { answer: String },

    #[error("question has no correct answer field")]
    MissingAnswer,
}

//
// ─── RAW RECORD ────────────────────────────────────────────────────────────────
//

/// Question shape as it appears in question bank files.
///
/// Bank files spell the correct answer either `correctAnswer` or `answer`;
/// both land in `correct_answer` here and are normalized by [`Question::from_record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, alias = "answer", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question.
///
/// `correct_answer` is guaranteed to equal exactly one entry of `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Build a question from its parts.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, there are fewer than two
    /// options, an option is blank or repeated, or the answer is not an option.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        let correct_answer = correct_answer.into();

        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        for (index, option) in options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(QuestionError::EmptyOption { index });
            }
            if options[..index].contains(option) {
                return Err(QuestionError::DuplicateOption {
                    option: option.clone(),
                });
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::AnswerNotInOptions {
                answer: correct_answer,
            });
        }

        Ok(Self {
            text,
            options,
            correct_answer,
        })
    }

    /// Normalize a bank record into a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::MissingAnswer` if neither answer spelling was
    /// present, otherwise the same errors as [`Question::new`].
    pub fn from_record(record: QuestionRecord) -> Result<Self, QuestionError> {
        let answer = record.correct_answer.ok_or(QuestionError::MissingAnswer)?;
        Self::new(record.question, record.options, answer)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_answer == option
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn accepts_answer_from_options() {
        let q = Question::new("2 + 2?", opts(&["3", "4"]), "4").unwrap();
        assert_eq!(q.correct_answer(), "4");
        assert!(q.has_option("3"));
        assert!(q.is_correct("4"));
        assert!(!q.is_correct("3"));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let err = Question::new("2 + 2?", opts(&["3", "5"]), "4").unwrap_err();
        assert_eq!(
            err,
            QuestionError::AnswerNotInOptions {
                answer: "4".into()
            }
        );
    }

    #[test]
    fn rejects_single_option() {
        let err = Question::new("Pick", opts(&["only"]), "only").unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { count: 1 });
    }

    #[test]
    fn rejects_duplicate_options() {
        let err = Question::new("Pick", opts(&["a", "b", "a"]), "a").unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateOption { .. }));
    }

    #[test]
    fn normalizes_both_answer_spellings() {
        let camel: QuestionRecord = serde_json::from_str(
            r#"{"question":"Q","options":["x","y"],"correctAnswer":"y"}"#,
        )
        .unwrap();
        let short: QuestionRecord =
            serde_json::from_str(r#"{"question":"Q","options":["x","y"],"answer":"y"}"#).unwrap();

        let a = Question::from_record(camel).unwrap();
        let b = Question::from_record(short).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.correct_answer(), "y");
    }

    #[test]
    fn record_without_answer_is_rejected() {
        let record: QuestionRecord =
            serde_json::from_str(r#"{"question":"Q","options":["x","y"]}"#).unwrap();
        assert_eq!(
            Question::from_record(record).unwrap_err(),
            QuestionError::MissingAnswer
        );
    }
}
