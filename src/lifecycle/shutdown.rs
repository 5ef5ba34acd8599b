//! Shutdown coordination.
//!
//! One state machine drives process termination:
//!
//! ```text
//! Running → Draining → Flushing → Terminated
//! ```
//!
//! A termination signal moves `Running → Draining` (duplicates are no-ops);
//! the HTTP server observes `Draining`, stops accepting, and finishes
//! in-flight requests; [`ShutdownCoordinator::finalize`] then flushes the
//! trace pipeline exactly once and reaches `Terminated` whether or not the
//! flush succeeded.

use tokio::sync::watch;

use crate::trace::ExportPipeline;

/// Phases of process termination, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Running,
    Draining,
    Flushing,
    Terminated,
}

/// Coordinator for graceful shutdown.
///
/// Holds the lifecycle state on a watch channel so any task can observe
/// transitions; all transitions are compare-and-set, so duplicate signals
/// and repeated advances are no-ops.
pub struct ShutdownCoordinator {
    tx: watch::Sender<LifecycleState>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Running);
        Self { tx }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Enter `Draining` from `Running`.
    ///
    /// Returns `true` if this call performed the transition; a duplicate
    /// signal returns `false` and changes nothing.
    pub fn begin(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == LifecycleState::Running {
                *state = LifecycleState::Draining;
                true
            } else {
                false
            }
        })
    }

    /// Move the state machine forward. Backward transitions are ignored.
    pub fn advance(&self, to: LifecycleState) -> bool {
        self.tx.send_if_modified(|state| {
            if to > *state {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    /// Resolves once draining has begun. Used as the server's
    /// graceful-shutdown future.
    pub async fn draining(&self) {
        let mut rx = self.tx.subscribe();
        while *rx.borrow_and_update() < LifecycleState::Draining {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Run the post-drain sequence: flush the trace pipeline (exactly once,
    /// enforced by the pipeline itself) and reach `Terminated`.
    ///
    /// Flush failure is logged, never fatal; the process still terminates
    /// cleanly.
    pub async fn finalize(&self, pipeline: &ExportPipeline) {
        self.advance(LifecycleState::Flushing);
        if let Err(err) = pipeline.shutdown().await {
            tracing::error!(error = %err, "Trace flush failed during shutdown");
        } else {
            tracing::info!("Trace pipeline flushed");
        }
        self.advance(LifecycleState::Terminated);
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
