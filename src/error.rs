// Error taxonomy shared by the store, repository and API layers

use crate::schema::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Malformed or missing input, reported per field
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("expense not found: {0}")]
    NotFound(i64),

    /// Underlying SQLite failure
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The session lock was poisoned by a panicking holder
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ExpenseError {
    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ExpenseError::Validation(_) => "validation_error",
            ExpenseError::NotFound(_) => "not_found",
            ExpenseError::Store(_) | ExpenseError::StoreUnavailable(_) => "store_error",
        }
    }
}

impl From<ValidationErrors> for ExpenseError {
    fn from(errors: ValidationErrors) -> Self {
        ExpenseError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, ExpenseError>;
