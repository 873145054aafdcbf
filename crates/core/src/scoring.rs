//! Score, percentage, grade band, and per-question review.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{AnswerRecord, Category};

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// Result band derived from the percentage. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeBand {
    /// Below 40.
    Low,
    /// 40 up to 60.
    Average,
    /// 60 up to 80.
    Good,
    /// 80 and above.
    Excellent,
}

impl GradeBand {
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => GradeBand::Excellent,
            60..80 => GradeBand::Good,
            40..60 => GradeBand::Average,
            _ => GradeBand::Low,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GradeBand::Excellent => "excellent",
            GradeBand::Good => "good",
            GradeBand::Average => "average",
            GradeBand::Low => "low",
        }
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Number of questions whose committed answer equals the correct answer.
#[must_use]
pub fn score(category: &Category, answers: &AnswerRecord) -> usize {
    category
        .questions()
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            answers
                .get(index)
                .is_some_and(|answer| question.is_correct(answer))
        })
        .count()
}

/// `score / total * 100`, rounded half-up.
///
/// # Panics
///
/// Panics if `total` is zero. Categories always hold at least one question.
#[must_use]
pub fn percentage(score: usize, total: usize) -> u32 {
    assert!(total > 0, "percentage of an empty category");
    let total = total as u64;
    let score = score as u64;
    let rounded = (score * 200 + total) / (total * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// One row of the results review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub chosen: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Everything the results screen shows for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub grade: GradeBand,
    pub review: Vec<QuestionReview>,
}

impl ScoreReport {
    #[must_use]
    pub fn new(category: &Category, answers: &AnswerRecord) -> Self {
        let total = category.len();
        let score = score(category, answers);
        let percentage = percentage(score, total);
        let review = category
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let chosen = answers.get(&index).cloned();
                QuestionReview {
                    index,
                    question: question.text().to_owned(),
                    is_correct: chosen.as_deref().is_some_and(|c| question.is_correct(c)),
                    chosen,
                    correct_answer: question.correct_answer().to_owned(),
                }
            })
            .collect();

        Self {
            score,
            total,
            percentage,
            grade: GradeBand::from_percentage(percentage),
            review,
        }
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.review.iter().filter(|r| r.chosen.is_none()).count()
    }
}
