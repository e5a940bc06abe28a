//! Test outcomes, reports and run summary.
//!
//! Every executed, cancelled or deselected test yields one [`TestReport`],
//! handed to each configured [`ReportSink`].

use crate::case::TestResult;
use crate::metadata::TestClassification;
use harness_common::Retryable;
use harness_contract::ContractViolation;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Final outcome of one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Passed
    Passed,
    /// Failed
    Failed,
    /// Known bug, failed as expected
    XFailed,
    /// Known bug, passed unexpectedly
    XPassed,
    /// Not started because the run was cancelled
    NotRun,
    /// Excluded by the category filter
    Deselected,
}

impl Outcome {
    /// Resolve an attempt result against the test's known-bug marking.
    #[must_use]
    pub const fn resolve(passed: bool, known_bug: bool) -> Self {
        match (passed, known_bug) {
            (true, false) => Self::Passed,
            (false, false) => Self::Failed,
            (false, true) => Self::XFailed,
            (true, true) => Self::XPassed,
        }
    }

    /// Resolve the final attempt of a test.
    ///
    /// A transport failure is never the expected outcome of a known bug: the
    /// API was not reached, so the test fails outright.
    #[must_use]
    pub fn from_attempt(result: &TestResult, known_bug: bool) -> Self {
        match result {
            Err(failure) if failure.is_retryable() => Self::Failed,
            _ => Self::resolve(result.is_ok(), known_bug),
        }
    }

    /// Uppercase label as printed in summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::XFailed => "XFAIL",
            Self::XPassed => "XPASS",
            Self::NotRun => "NOT RUN",
            Self::Deselected => "DESELECTED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report of one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    /// Test id
    pub test_id: String,
    /// Worker that ran the test, empty when it never ran
    pub worker: String,
    /// Merged classification
    pub classification: TestClassification,
    /// Outcome
    pub outcome: Outcome,
    /// Contract violations of the final attempt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ContractViolation>,
    /// Failure message of the final attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Attempts made (0 when never run)
    pub attempts: u32,
    /// Wall-clock time across all attempts
    pub duration_ms: u64,
}

impl TestReport {
    /// Report for a test that never ran.
    #[must_use]
    pub fn skipped(test_id: &str, classification: TestClassification, outcome: Outcome) -> Self {
        Self {
            test_id: test_id.to_string(),
            worker: String::new(),
            classification,
            outcome,
            violations: Vec::new(),
            error: None,
            attempts: 0,
            duration_ms: 0,
        }
    }
}

/// Destination for test reports.
pub trait ReportSink: Send + Sync {
    /// Record one report.
    fn record(&self, report: &TestReport);

    /// Flush buffered output at the end of the run.
    fn flush(&self) {}
}

/// Logs each report through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&self, report: &TestReport) {
        let title = report.classification.title.as_deref().unwrap_or_default();
        match report.outcome {
            Outcome::Failed => error!(
                test_id = %report.test_id,
                worker = %report.worker,
                attempts = report.attempts,
                violations = report.violations.len(),
                error = report.error.as_deref().unwrap_or_default(),
                "{} {title}", report.outcome
            ),
            Outcome::XPassed => warn!(
                test_id = %report.test_id,
                reason = report.classification.xfail_reason().unwrap_or_default(),
                "Known-bug test passed unexpectedly"
            ),
            Outcome::XFailed => info!(
                test_id = %report.test_id,
                reason = report.classification.xfail_reason().unwrap_or_default(),
                "{} {title}", report.outcome
            ),
            _ => info!(
                test_id = %report.test_id,
                worker = %report.worker,
                duration_ms = report.duration_ms,
                "{} {title}", report.outcome
            ),
        }
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<TestReport>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports recorded so far, in arrival order.
    #[must_use]
    pub fn reports(&self) -> Vec<TestReport> {
        self.reports.lock().clone()
    }

    /// Report for one test.
    #[must_use]
    pub fn report_for(&self, test_id: &str) -> Option<TestReport> {
        self.reports
            .lock()
            .iter()
            .find(|r| r.test_id == test_id)
            .cloned()
    }
}

impl ReportSink for MemorySink {
    fn record(&self, report: &TestReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Appends reports as JSON lines to `<dir>/results.jsonl`.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// File name inside the results directory.
    pub const FILE_NAME: &'static str = "results.jsonl";

    /// Open (creating the directory if needed) for appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory or file cannot be created.
    pub fn create(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Output file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonLinesSink {
    fn record(&self, report: &TestReport) {
        let line = match serde_json::to_string(report) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, test_id = %report.test_id, "Failed to serialize report");
                return;
            }
        };
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{line}") {
            warn!(error = %e, path = %self.path.display(), "Failed to write report");
        }
    }

    fn flush(&self) {
        if let Err(e) = self.writer.lock().flush() {
            warn!(error = %e, path = %self.path.display(), "Failed to flush reports");
        }
    }
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Collected tests
    pub total: usize,
    /// Passed
    pub passed: usize,
    /// Failed
    pub failed: usize,
    /// Known bugs that failed as expected
    pub xfailed: usize,
    /// Known bugs that passed
    pub xpassed: usize,
    /// Excluded by the category filter
    pub deselected: usize,
    /// Not started because the run was cancelled
    pub not_run: usize,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// Wall-clock duration
    pub duration: Duration,
    /// Worker sessions that ran tests
    pub sessions: Vec<SessionStats>,
}

/// Per-worker session statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Worker id
    pub worker_id: String,
    /// Tests executed by the worker
    pub tests_run: usize,
    /// API clients the session constructed
    pub clients_built: usize,
}

impl RunSummary {
    /// Count one outcome.
    pub const fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::XFailed => self.xfailed += 1,
            Outcome::XPassed => self.xpassed += 1,
            Outcome::NotRun => self.not_run += 1,
            Outcome::Deselected => self.deselected += 1,
        }
    }

    /// Fold another summary's counts into this one.
    pub fn merge(&mut self, other: Self) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.xfailed += other.xfailed;
        self.xpassed += other.xpassed;
        self.deselected += other.deselected;
        self.not_run += other.not_run;
        self.interrupted |= other.interrupted;
        self.sessions.extend(other.sessions);
    }

    /// Whether the run passed: nothing failed and nothing was cut short.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }

    /// Process exit code: 0 on success, 1 on failures, 2 when interrupted.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.interrupted {
            2
        } else if self.failed > 0 {
            1
        } else {
            0
        }
    }

    /// One-line summary in the style `3 passed, 1 failed, 2 xfailed in 1.52s`.
    #[must_use]
    pub fn headline(&self) -> String {
        let parts: Vec<String> = [
            (self.passed, "passed"),
            (self.failed, "failed"),
            (self.xfailed, "xfailed"),
            (self.xpassed, "xpassed"),
            (self.deselected, "deselected"),
            (self.not_run, "not run"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();

        let counts = if parts.is_empty() {
            "no tests ran".to_string()
        } else {
            parts.join(", ")
        };
        format!("{counts} in {:.2}s", self.duration.as_secs_f64())
    }

    /// Log the summary.
    pub fn log(&self) {
        info!(
            total = self.total,
            passed = self.passed,
            failed = self.failed,
            xfailed = self.xfailed,
            xpassed = self.xpassed,
            deselected = self.deselected,
            not_run = self.not_run,
            interrupted = self.interrupted,
            "{}",
            self.headline()
        );
    }
}
