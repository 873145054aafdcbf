mod persistence;
mod service;
mod single;
mod snapshot;

// Public API of the quiz subsystem.
pub use crate::error::QuizServiceError;
pub use service::QuizService;
pub use single::SingleQuizService;
pub use snapshot::{CategoryHeader, QuestionView, QuizSnapshot};
