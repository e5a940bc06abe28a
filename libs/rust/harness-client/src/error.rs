//! Client error types using thiserror 2.0.
//!
//! Transport failures are retryable; everything else is a defect in the test
//! or its inputs.

use harness_common::Retryable;
use std::time::Duration;
use thiserror::Error;

/// API client errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection refused, reset or otherwise failed below HTTP
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    Decode(String),

    /// Caller passed an argument the client cannot act on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client construction failed
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Classify a transport error from reqwest.
    #[must_use]
    pub fn from_transport(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout)
        } else if error.is_decode() || error.is_body() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl Retryable for ClientError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");
        let err = ClientError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ClientError::Network("reset".to_string()).is_retryable());
        assert!(ClientError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(!ClientError::Decode("eof".to_string()).is_retryable());
        assert!(!ClientError::invalid_input("max_attempts").is_retryable());
        assert!(!ClientError::Build("tls".to_string()).is_retryable());
    }
}
