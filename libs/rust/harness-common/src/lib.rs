//! Shared plumbing for the signup API harness.
//!
//! This crate provides centralized implementations for:
//! - Environment configuration with per-environment profiles
//! - Retryability classification shared by every harness error type
//! - HTTP client configuration and building
//! - Retry policy with a fixed inter-attempt delay
//! - Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod retry;
pub mod tracing_config;

pub use config::{Environment, HarnessConfig};
pub use error::{ConfigError, Retryable};
pub use http::{HttpConfig, build_http_client};
pub use retry::{RetryConfig, RetryPolicy};
pub use tracing_config::{TracingConfig, init_tracing};
