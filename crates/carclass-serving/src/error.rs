//! Error types for the carclass-serving crate.
//!
//! The taxonomy maps directly to transport responses: invalid input is a
//! client error (400), a missing record is 404, and everything else is a
//! server error (500). No layer retries; every failure surfaces to the caller
//! as a single terminal error.

use carclass_store::StoreError;
use carclass_vision::VisionError;
use thiserror::Error;

/// Result type alias for serving operations.
pub type ServingResult<T> = Result<T, ServingError>;

/// Errors that can occur in the serving layer.
#[derive(Debug, Error)]
pub enum ServingError {
    /// The upload is not an image or could not be decoded.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Neither the real model nor the fallback could be constructed.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Running the classifier failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Reading or writing the record store failed.
    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    /// No prediction record exists with the requested id.
    #[error("Prediction {0} not found")]
    NotFound(i64),

    /// I/O error (upload directory, image file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServingError {
    /// Create an invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a model-unavailable error.
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this is a client error (bad request).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error() && !self.is_not_found()
    }
}

impl From<VisionError> for ServingError {
    fn from(err: VisionError) -> Self {
        match err {
            // Undecodable bytes are the client's fault.
            VisionError::Decode(e) => Self::InvalidInput(format!("Failed to decode image: {e}")),
            VisionError::Tensor(e) => Self::Internal(e),
        }
    }
}

impl From<StoreError> for ServingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

impl From<candle_core::Error> for ServingError {
    fn from(err: candle_core::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServingError::invalid_input("not an image");
        assert_eq!(err.to_string(), "Invalid input: not an image");

        let err = ServingError::NotFound(7);
        assert_eq!(err.to_string(), "Prediction 7 not found");
    }

    #[test]
    fn test_classification() {
        assert!(ServingError::invalid_input("bad").is_client_error());
        assert!(!ServingError::invalid_input("bad").is_server_error());

        assert!(ServingError::NotFound(1).is_not_found());
        assert!(!ServingError::NotFound(1).is_server_error());

        assert!(ServingError::model_unavailable("none").is_server_error());
        assert!(ServingError::inference("shape").is_server_error());
        assert!(ServingError::internal("oops").is_server_error());
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: ServingError = StoreError::NotFound(3).into();
        assert!(matches!(err, ServingError::NotFound(3)));
    }

    #[test]
    fn test_store_failure_maps_to_persistence() {
        let store_err = StoreError::from(std::io::Error::other("disk gone"));
        let err: ServingError = store_err.into();
        assert!(matches!(err, ServingError::Persistence(_)));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_vision_decode_maps_to_invalid_input() {
        let decode_err = carclass_vision::preprocess(b"junk").unwrap_err();
        let err: ServingError = decode_err.into();
        assert!(err.is_client_error());
    }
}
