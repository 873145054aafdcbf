//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::EngineError;
use quiz_core::model::{BankError, CategoryId};

/// Errors emitted by quiz services.
///
/// Storage failures never show up here: the services keep running in memory
/// and log instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors emitted while loading the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("question bank has no category {0}")]
    UnknownCategory(CategoryId),
}
