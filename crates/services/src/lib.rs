#![forbid(unsafe_code)]

pub mod error;
pub mod question_source;
pub mod quiz;
pub mod settings;

pub use error::{QuestionSourceError, QuizServiceError};
pub use question_source::{load_bank, single_category};
pub use quiz::{CategoryHeader, QuestionView, QuizService, QuizSnapshot, SingleQuizService};
pub use settings::QuizSettings;
