//! Signup API Suite
//!
//! Parallel test harness for the signup, OTP verification and OTP resend
//! endpoints of the authentication API:
//! - Metadata tags classifying tests, merged and checked before the run
//! - One lazily built API client per worker session
//! - Runner with retries, fail-fast, category filtering and interrupts
//! - Report sinks and the run summary

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod case;
pub mod checks;
pub mod error;
pub mod lifecycle;
pub mod metadata;
pub mod readme;
pub mod report;
pub mod runner;
pub mod shutdown;
pub mod suite;

pub use case::{TestCase, TestContext, TestGroup, TestResult};
pub use error::{RunError, TestFailure};
pub use lifecycle::WorkerSession;
pub use metadata::{Category, ClassificationError, MetadataRegistry, Severity, Tag, TestClassification};
pub use report::{JsonLinesSink, MemorySink, Outcome, ReportSink, RunSummary, TestReport};
pub use runner::Runner;
pub use shutdown::{RunControl, StopReason};
pub use suite::signup_suite;
