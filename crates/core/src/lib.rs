#![forbid(unsafe_code)]

pub mod document;
pub mod engine;
pub mod error;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod single;
pub mod transition;

pub use document::{PersistedDocument, SingleDocument, DOCUMENT_KEY, SINGLE_DOCUMENT_KEY};
pub use engine::{CategoryOverview, QuizEngine};
pub use error::EngineError;
pub use progress::QuizProgress;
pub use scoring::{GradeBand, QuestionReview, ScoreReport};
pub use single::SingleQuizEngine;
pub use transition::{Transition, TRANSITION_DELAY};
