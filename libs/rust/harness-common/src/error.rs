//! Shared error plumbing.
//!
//! Every harness crate defines its own error enum; they all classify
//! themselves through [`Retryable`] so the retry policy can decide whether a
//! failed attempt is worth repeating.

use thiserror::Error;

/// Classification of a failure as transient or permanent.
///
/// Transient failures (connection refused, timeouts) may succeed when the
/// attempt is repeated. Everything else, such as a contract mismatch or an
/// unexpected status code, will fail the same way again.
pub trait Retryable {
    /// Check if the failure is transient.
    fn is_retryable(&self) -> bool;
}

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Environment variable holding the URL
        field: String,
        /// Parser message
        reason: String,
    },

    /// Environment variable could not be parsed
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Environment variable name
        name: String,
        /// Parser message
        reason: String,
    },

    /// Value parsed but is outside its allowed range
    #[error("Invalid value for {name}: {reason}")]
    OutOfRange {
        /// Environment variable name
        name: String,
        /// Which rule was broken
        reason: String,
    },
}

impl ConfigError {
    /// Create an out-of-range error.
    #[must_use]
    pub fn out_of_range(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl Retryable for ConfigError {
    fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_not_retryable() {
        assert!(!ConfigError::out_of_range("PARALLEL_WORKERS", "must be >= 1").is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::out_of_range("API_TIMEOUT", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "Invalid value for API_TIMEOUT: must be greater than 0"
        );

        let err = ConfigError::ParseError {
            name: "RETRY_COUNT".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().starts_with("Failed to parse environment variable RETRY_COUNT"));
    }
}
