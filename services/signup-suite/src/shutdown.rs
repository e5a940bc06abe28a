//! Run cancellation and signal handling.
//!
//! A [`RunControl`] is shared by every worker. Fail-fast stops new tests from
//! starting while in-flight ones finish; an interrupt also abandons the tests
//! currently running.

use std::io;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

/// Why a run stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The failure threshold was reached
    FailFast,
    /// SIGINT/SIGTERM or an explicit interrupt
    Interrupted,
}

/// Cooperative stop signal for a run.
#[derive(Debug, Clone)]
pub struct RunControl {
    tx: Arc<watch::Sender<Option<StopReason>>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    /// Creates a control in the running state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request a stop. Only the first request is kept, except that an
    /// interrupt overrides an earlier fail-fast.
    ///
    /// Returns whether the state changed.
    pub fn stop(&self, reason: StopReason) -> bool {
        self.tx.send_if_modified(|current| match (*current, reason) {
            (None, _) | (Some(StopReason::FailFast), StopReason::Interrupted) => {
                *current = Some(reason);
                true
            }
            _ => false,
        })
    }

    /// Current stop reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<StopReason> {
        *self.tx.borrow()
    }

    /// Whether new tests must not start.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.reason().is_some()
    }

    /// Whether the run was interrupted.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.reason() == Some(StopReason::Interrupted)
    }

    /// Resolves once the run is interrupted.
    pub async fn interrupted(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on interrupt.
        let _ = rx
            .wait_for(|reason| *reason == Some(StopReason::Interrupted))
            .await;
    }
}

/// Waits for SIGTERM or SIGINT.
///
/// # Errors
///
/// Returns the I/O error if a signal handler cannot be installed.
pub async fn wait_for_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, interrupting run");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, interrupting run");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, interrupting run");
    }

    Ok(())
}

/// Interrupt `control` when a termination signal arrives.
pub fn interrupt_on_signal(control: RunControl) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                control.stop(StopReason::Interrupted);
            }
            Err(e) => tracing::warn!(error = %e, "Signal handlers unavailable, interrupts disabled"),
        }
    })
}
