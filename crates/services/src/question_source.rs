use std::path::Path;

use quiz_core::model::{Category, CategoryId, QuestionBank};

use crate::error::QuestionSourceError;

/// Read and validate a question bank file.
///
/// # Errors
///
/// Returns `QuestionSourceError::Io` if the file cannot be read and
/// `QuestionSourceError::Bank` if its contents are invalid.
pub async fn load_bank(path: impl AsRef<Path>) -> Result<QuestionBank, QuestionSourceError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| QuestionSourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let bank = QuestionBank::from_json(&raw)?;
    tracing::debug!(
        path = %path.display(),
        categories = bank.categories().len(),
        "loaded question bank"
    );
    Ok(bank)
}

/// Pick one category out of a bank for the single-category quiz.
///
/// # Errors
///
/// Returns `QuestionSourceError::UnknownCategory` if the bank does not have it.
pub fn single_category(bank: &QuestionBank, id: &CategoryId) -> Result<Category, QuestionSourceError> {
    bank.category(id)
        .cloned()
        .ok_or_else(|| QuestionSourceError::UnknownCategory(id.clone()))
}
