//! Suite runner.
//!
//! Collects and classifies every test up front, splits the selected tests into
//! disjoint per-worker sets and runs the workers in parallel. Within a worker,
//! tests run one after another, each attempt completing before the next.

use crate::case::{TestBody, TestContext, TestGroup};
use crate::error::{RunError, TestFailure};
use crate::lifecycle::WorkerSession;
use crate::metadata::{Category, MetadataRegistry, TestClassification};
use crate::report::{Outcome, ReportSink, RunSummary, SessionStats, TestReport, TracingSink};
use crate::shutdown::{RunControl, StopReason};
use futures::FutureExt;
use harness_common::{HarnessConfig, RetryPolicy};
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

/// A collected test, ready to run.
struct PlannedTest {
    id: String,
    classification: TestClassification,
    body: TestBody,
}

/// One worker's queue and results, owned outside the worker future so a
/// crashed worker still accounts for every test it was given.
struct WorkerState {
    worker_id: String,
    pending: VecDeque<PlannedTest>,
    in_flight: Option<(String, TestClassification)>,
    summary: RunSummary,
}

/// State shared by all workers of a run.
struct RunShared {
    config: Arc<HarnessConfig>,
    retry: RetryPolicy,
    sinks: Vec<Arc<dyn ReportSink>>,
    control: RunControl,
    failures: AtomicUsize,
}

impl RunShared {
    fn publish(&self, report: &TestReport) {
        for sink in &self.sinks {
            sink.record(report);
        }
    }

    fn note_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(max) = self.config.max_failures else {
            return;
        };
        if failures >= max && self.control.stop(StopReason::FailFast) {
            warn!(failures, max_failures = max, "Failure threshold reached, no new tests will start");
        }
    }
}

/// Runs test groups against the configured API.
pub struct Runner {
    config: Arc<HarnessConfig>,
    sinks: Vec<Arc<dyn ReportSink>>,
    control: RunControl,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .field("control", &self.control)
            .finish()
    }
}

impl Runner {
    /// Create a runner that logs reports through tracing.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config: Arc::new(config),
            sinks: vec![Arc::new(TracingSink)],
            control: RunControl::new(),
        }
    }

    /// Add a report sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Handle for stopping the run from outside.
    #[must_use]
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    /// Run configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Collect, classify and run `groups`.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Classification`] for duplicate ids or conflicting
    /// tags and [`RunError::InvalidFilter`] for an unknown category filter.
    /// Both are raised before any test runs.
    pub async fn run(&self, groups: Vec<TestGroup>) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let planned = collect(groups)?;
        let filter = self.category_filter()?;

        let mut summary = RunSummary::default();
        let shared = Arc::new(RunShared {
            config: Arc::clone(&self.config),
            retry: RetryPolicy::new(self.config.retry_config()),
            sinks: self.sinks.clone(),
            control: self.control.clone(),
            failures: AtomicUsize::new(0),
        });

        let (selected, deselected): (Vec<_>, Vec<_>) = planned
            .into_iter()
            .partition(|t| filter.is_none_or(|c| t.classification.category == Some(c)));
        for test in deselected {
            let report = TestReport::skipped(&test.id, test.classification, Outcome::Deselected);
            shared.publish(&report);
            summary.record(Outcome::Deselected);
        }

        let expected = summary.total + selected.len();
        let workers = self.config.parallel_workers.clamp(1, selected.len().max(1));
        info!(
            collected = expected,
            selected = selected.len(),
            workers,
            category = filter.map(Category::as_str),
            "Starting run"
        );

        let mut buckets: Vec<Vec<PlannedTest>> = (0..workers).map(|_| Vec::new()).collect();
        for (i, test) in selected.into_iter().enumerate() {
            buckets[i % workers].push(test);
        }

        let mut set = JoinSet::new();
        for (i, tests) in buckets.into_iter().enumerate() {
            if tests.is_empty() {
                continue;
            }
            let state = WorkerState {
                worker_id: format!("gw{i}"),
                pending: tests.into(),
                in_flight: None,
                summary: RunSummary::default(),
            };
            let span = info_span!("worker", worker = %state.worker_id);
            set.spawn(supervise_worker(Arc::clone(&shared), state).instrument(span));
        }

        while let Some(result) = set.join_next().await {
            match result {
                Ok(worker_summary) => summary.merge(worker_summary),
                Err(e) => error!(error = %e, "Worker task failed"),
            }
        }

        let lost = expected.saturating_sub(summary.total);
        if lost > 0 {
            error!(lost, "Tests lost with their worker, counting them as failed");
            for _ in 0..lost {
                summary.record(Outcome::Failed);
            }
        }

        for sink in &shared.sinks {
            sink.flush();
        }
        summary.interrupted = self.control.is_interrupted();
        summary.duration = started.elapsed();
        Ok(summary)
    }

    fn category_filter(&self) -> Result<Option<Category>, RunError> {
        self.config
            .category_filter
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                raw.parse::<Category>()
                    .map_err(|_| RunError::InvalidFilter(raw.to_string()))
            })
            .transpose()
    }
}

fn collect(groups: Vec<TestGroup>) -> Result<Vec<PlannedTest>, RunError> {
    let mut registry = MetadataRegistry::new();
    let mut planned = Vec::new();
    for group in groups {
        for case in group.cases {
            let id = format!("{}::{}", group.name, case.id);
            let classification = registry
                .register(&id, group.tags.iter().chain(case.tags.iter()))?
                .clone();
            planned.push(PlannedTest {
                id,
                classification,
                body: case.body,
            });
        }
    }
    Ok(planned)
}

/// Run a worker and account for its remaining tests if it crashes.
///
/// The in-flight test is reported failed, tests never started are reported
/// as not run.
async fn supervise_worker(shared: Arc<RunShared>, mut state: WorkerState) -> RunSummary {
    let crashed = AssertUnwindSafe(run_worker(&shared, &mut state))
        .catch_unwind()
        .await;
    let Err(payload) = crashed else {
        return state.summary;
    };

    let message = panic_message(payload.as_ref());
    error!(error = %message, remaining = state.pending.len(), "Worker crashed");
    if let Some((id, classification)) = state.in_flight.take() {
        let mut report = TestReport::skipped(&id, classification, Outcome::Failed);
        report.worker.clone_from(&state.worker_id);
        report.error = Some(format!("Worker crashed: {message}"));
        shared.publish(&report);
        state.summary.record(Outcome::Failed);
    }
    for test in state.pending.drain(..) {
        shared.publish(&TestReport::skipped(&test.id, test.classification, Outcome::NotRun));
        state.summary.record(Outcome::NotRun);
    }
    state.summary
}

async fn run_worker(shared: &RunShared, state: &mut WorkerState) {
    let session = WorkerSession::new(state.worker_id.as_str(), Arc::clone(&shared.config));
    info!(tests = state.pending.len(), "Worker started");

    while let Some(test) = state.pending.pop_front() {
        if shared.control.is_stopped() {
            let report = TestReport::skipped(&test.id, test.classification, Outcome::NotRun);
            shared.publish(&report);
            state.summary.record(Outcome::NotRun);
            continue;
        }

        state.in_flight = Some((test.id.clone(), test.classification.clone()));
        let report = tokio::select! {
            report = execute(shared, &session, &test) => report,
            () = shared.control.interrupted() => {
                warn!(test_id = %test.id, "Test abandoned on interrupt");
                TestReport::skipped(&test.id, test.classification.clone(), Outcome::NotRun)
            }
        };
        if report.outcome == Outcome::Failed {
            shared.note_failure();
        }
        shared.publish(&report);
        state.summary.record(report.outcome);
        state.in_flight = None;
    }

    state.summary.sessions.push(SessionStats {
        worker_id: state.worker_id.clone(),
        tests_run: session.tests_run(),
        clients_built: session.clients_built(),
    });
    info!(tests_run = session.tests_run(), "Worker finished");
    session.close();
}

async fn execute(shared: &RunShared, session: &WorkerSession, test: &PlannedTest) -> TestReport {
    let started = Instant::now();
    let mut attempts = 0;
    info!(test_id = %test.id, "Test started");
    session.record_test();

    let result = shared
        .retry
        .execute(|attempt| {
            attempts = attempt;
            run_attempt(session, test, attempt)
        })
        .await;

    let outcome = Outcome::from_attempt(&result, test.classification.is_known_bug());
    let (violations, error) = match &result {
        Ok(()) => (Vec::new(), None),
        Err(failure) => (failure.violations().to_vec(), Some(failure.to_string())),
    };
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        test_id = %test.id,
        outcome = %outcome,
        attempts,
        duration_ms,
        "Test finished"
    );

    TestReport {
        test_id: test.id.clone(),
        worker: session.worker_id().to_string(),
        classification: test.classification.clone(),
        outcome,
        violations,
        error,
        attempts,
        duration_ms,
    }
}

async fn run_attempt(session: &WorkerSession, test: &PlannedTest, attempt: u32) -> Result<(), TestFailure> {
    let client = session.client().await?;
    let ctx = TestContext {
        client,
        data: session.data(),
        test_id: &test.id,
        attempt,
    };
    if attempt > 1 {
        info!(test_id = %test.id, attempt, "Retrying test");
    }

    match AssertUnwindSafe(async { (test.body)(&ctx).await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(payload) => Err(TestFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
