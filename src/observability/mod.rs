//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Request traces are a separate subsystem (crate::trace) with its own
//! export pipeline.
//! ```
//!
//! # Design Decisions
//! - Structured logging via the tracing crate, initialized once at startup
//! - Metrics are cheap (atomic increments) and optional

pub mod logging;
pub mod metrics;
