//! Test data for the signup API harness.
//!
//! This crate provides:
//! - [`DataFactory`], producing payloads whose emails never collide across
//!   concurrently running workers
//! - Fixtures with sample request inputs and response bodies
//!
//! With the `testing` feature it also provides proptest generators for payload
//! fields and negative-path inputs, and a stateful mock of the signup API for
//! wiremock servers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod factory;
pub mod fixtures;
#[cfg(any(test, feature = "testing"))]
pub mod generators;
#[cfg(any(test, feature = "testing"))]
pub mod mocks;
mod names;
pub mod payload;

pub use error::GenerationError;
pub use factory::{DEFAULT_EMAIL_PREFIX, DataFactory, UniquenessToken};
#[cfg(any(test, feature = "testing"))]
pub use mocks::MockSignupApi;
pub use payload::{Payload, PayloadField, PayloadOverrides};
