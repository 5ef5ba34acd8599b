//! OS signal handling.
//!
//! Translates SIGTERM and SIGINT into the shutdown sequence. Both signals
//! mean the same thing here; whichever arrives first starts the drain and
//! any later signal is ignored by the coordinator.

use std::sync::Arc;

use crate::lifecycle::shutdown::ShutdownCoordinator;

/// Listen for termination signals for the life of the process.
pub async fn listen(coordinator: Arc<ShutdownCoordinator>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                return;
            }
        };

        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(err) = result {
                        tracing::error!(error = %err, "Failed to listen for SIGINT");
                        return;
                    }
                }
                _ = terminate.recv() => {}
            }
            notify(&coordinator);
        }
    }

    #[cfg(not(unix))]
    {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            notify(&coordinator);
        }
    }
}

fn notify(coordinator: &ShutdownCoordinator) {
    if coordinator.begin() {
        tracing::info!("Termination signal received, draining");
    } else {
        tracing::debug!("Duplicate termination signal ignored");
    }
}
