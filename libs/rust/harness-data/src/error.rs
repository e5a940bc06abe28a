//! Generation errors.

use harness_common::Retryable;
use thiserror::Error;

/// Invalid arguments passed to the data factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Requested password length was zero
    #[error("Password length must be greater than 0")]
    ZeroLength,

    /// Email prefix was empty or contained characters not allowed in a local part
    #[error("Invalid email prefix: {0:?}")]
    InvalidPrefix(String),

    /// Email domain was empty or malformed
    #[error("Invalid email domain: {0:?}")]
    InvalidDomain(String),

    /// No name table exists for the locale
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Unknown payload field name
    #[error("Unknown payload field: {0}")]
    UnknownField(String),
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        false
    }
}
