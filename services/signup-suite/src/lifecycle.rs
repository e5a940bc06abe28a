//! Per-worker session lifecycle.
//!
//! A [`WorkerSession`] owns the one API client its worker uses, created lazily
//! on first use and released when the session ends, whether the worker
//! finished, failed, panicked or was cancelled.

use harness_client::{ApiClient, ClientError};
use harness_common::HarnessConfig;
use harness_data::DataFactory;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Session state of one worker.
#[derive(Debug)]
pub struct WorkerSession {
    worker_id: String,
    config: Arc<HarnessConfig>,
    client: OnceCell<ApiClient>,
    data: DataFactory,
    clients_built: AtomicUsize,
    tests_run: AtomicUsize,
}

impl WorkerSession {
    /// Open a session. No client is built until first requested.
    #[must_use]
    pub fn new(worker_id: impl Into<String>, config: Arc<HarnessConfig>) -> Self {
        let worker_id = worker_id.into();
        let data = DataFactory::new(&worker_id).with_domain(config.email_domain.clone());
        debug!(worker = %worker_id, "Worker session opened");
        Self {
            worker_id,
            config,
            client: OnceCell::new(),
            data,
            clients_built: AtomicUsize::new(0),
            tests_run: AtomicUsize::new(0),
        }
    }

    /// Worker id.
    #[must_use]
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// The session's API client, built on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when the client cannot be constructed.
    /// A later call tries again.
    pub async fn client(&self) -> Result<&ApiClient, ClientError> {
        self.client
            .get_or_try_init(|| async {
                let client = ApiClient::new(&self.config)?;
                self.clients_built.fetch_add(1, Ordering::Relaxed);
                info!(worker = %self.worker_id, base_url = client.base_url(), "API client created");
                Ok(client)
            })
            .await
    }

    /// Whether the client has been built.
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.initialized()
    }

    /// The session's data factory.
    #[must_use]
    pub const fn data(&self) -> &DataFactory {
        &self.data
    }

    /// Count one executed test.
    pub fn record_test(&self) {
        self.tests_run.fetch_add(1, Ordering::Relaxed);
    }

    /// Tests executed in this session.
    #[must_use]
    pub fn tests_run(&self) -> usize {
        self.tests_run.load(Ordering::Relaxed)
    }

    /// API clients built by this session.
    #[must_use]
    pub fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::Relaxed)
    }

    /// End the session, releasing the client.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for WorkerSession {
    fn drop(&mut self) {
        if self.client.take().is_some() {
            info!(
                worker = %self.worker_id,
                tests_run = self.tests_run(),
                "API client released"
            );
        }
        debug!(worker = %self.worker_id, "Worker session closed");
    }
}
