//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → ShutdownCoordinator::begin
//!
//! Shutdown (shutdown.rs):
//!     Running → Draining (stop accepting, finish in-flight)
//!             → Flushing (one trace flush, failure logged)
//!             → Terminated (exit 0)
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{LifecycleState, ShutdownCoordinator};
