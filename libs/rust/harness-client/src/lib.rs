//! HTTP client for the signup API under test.
//!
//! Wraps the signup, confirmation and resend endpoints so test cases never
//! build raw requests, and implements the resend rate-limit probe.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod endpoints;
pub mod error;
pub mod response;

pub use client::ApiClient;
pub use endpoints::Endpoint;
pub use error::{ClientError, ClientResult};
pub use response::{ApiResponse, RateLimitProbe};
