//! Error types for the carclass-store crate.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the prediction record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists with the requested id.
    #[error("Prediction {0} not found")]
    NotFound(i64),

    /// The underlying SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Encoding or decoding the probability distribution column failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Check whether this error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound(42);
        assert_eq!(err.to_string(), "Prediction 42 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_database_error_is_not_not_found() {
        let err = StoreError::Database(rusqlite::Error::InvalidQuery);
        assert!(!err.is_not_found());
    }
}
