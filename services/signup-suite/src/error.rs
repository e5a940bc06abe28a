//! Error types for test execution and run setup.
//!
//! [`TestFailure`] is what a single test attempt fails with. Only transport
//! failures are retryable; everything else is final for the attempt.
//! [`RunError`] blocks a run before any test executes.

use crate::metadata::ClassificationError;
use harness_client::{ApiResponse, ClientError};
use harness_common::Retryable;
use harness_contract::{ContractFailure, ContractViolation};
use harness_data::GenerationError;
use thiserror::Error;

const MAX_BODY_IN_MESSAGE: usize = 200;

/// Failure of one test attempt.
#[derive(Error, Debug)]
pub enum TestFailure {
    /// Test data could not be generated
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Response body broke its contract
    #[error(transparent)]
    Contract(#[from] ContractFailure),

    /// Request never produced a response
    #[error(transparent)]
    Client(#[from] ClientError),

    /// API answered with a status outside the expected set
    #[error("{context}: expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        /// Operation under test
        context: String,
        /// Accepted statuses
        expected: String,
        /// Received status
        actual: u16,
        /// Body text, truncated
        body: String,
    },

    /// A test assertion did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// The test body panicked
    #[error("Test panicked: {0}")]
    Panicked(String),
}

impl TestFailure {
    /// Create an assertion failure.
    #[must_use]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    /// Create an unexpected status failure from a response.
    #[must_use]
    pub fn unexpected_status(context: &str, expected: &[u16], response: &ApiResponse) -> Self {
        let expected = expected
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(" or ");
        let body = if response.text.chars().count() > MAX_BODY_IN_MESSAGE {
            let truncated: String = response.text.chars().take(MAX_BODY_IN_MESSAGE).collect();
            format!("{truncated}...")
        } else {
            response.text.clone()
        };
        Self::UnexpectedStatus {
            context: context.to_string(),
            expected,
            actual: response.status,
            body,
        }
    }

    /// Contract violations carried by this failure, if any.
    #[must_use]
    pub fn violations(&self) -> &[ContractViolation] {
        match self {
            Self::Contract(failure) => &failure.violations,
            _ => &[],
        }
    }
}

impl Retryable for TestFailure {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Client(err) => err.is_retryable(),
            _ => false,
        }
    }
}

/// Errors that prevent a run from starting.
#[derive(Error, Debug)]
pub enum RunError {
    /// Suite definition is inconsistent
    #[error("Suite definition rejected: {0}")]
    Classification(#[from] ClassificationError),

    /// Category filter names no known category
    #[error("Unknown test category filter: {0}")]
    InvalidFilter(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_transport_failures_retry() {
        assert!(TestFailure::from(ClientError::Network("refused".to_string())).is_retryable());
        assert!(TestFailure::from(ClientError::Timeout(Duration::from_secs(1))).is_retryable());
        assert!(!TestFailure::from(ClientError::Decode("eof".to_string())).is_retryable());
        assert!(!TestFailure::assertion("x").is_retryable());
        assert!(!TestFailure::from(GenerationError::ZeroLength).is_retryable());
        assert!(!TestFailure::Panicked("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_unexpected_status_message() {
        let response = ApiResponse::from_parts(
            500,
            "x".repeat(300),
            Duration::from_millis(3),
        );
        let failure = TestFailure::unexpected_status("signup", &[201, 200], &response);
        let message = failure.to_string();
        assert!(message.starts_with("signup: expected status 201 or 200, got 500: "));
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_violations_exposed_for_contract_failures() {
        let failure = TestFailure::from(ContractFailure {
            contract: "error".to_string(),
            context: None,
            violations: vec![ContractViolation {
                field_path: "code".to_string(),
                expected: "string".to_string(),
                actual: "missing".to_string(),
            }],
        });
        assert_eq!(failure.violations().len(), 1);
        assert!(TestFailure::assertion("x").violations().is_empty());
    }
}
