use thiserror::Error;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Strategy name already exists: {0}")]
    DuplicateStrategyName(String),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type JournalResult<T> = Result<T, JournalError>;

impl<T> From<std::sync::PoisonError<T>> for JournalError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        JournalError::LockPoisoned
    }
}
