//! Request tracing subsystem.
//!
//! # Data Flow
//! ```text
//! handler opens root span (tracer.rs)
//!     → derives a TraceContext (context.rs)
//!     → child spans opened per downstream call, closed by guard (span.rs)
//!     → finished spans queued to the worker (export.rs)
//!     → batches delivered to the collector; one flush at shutdown
//! ```
//!
//! # Design Decisions
//! - The active context is an explicit immutable value passed by argument,
//!   never a mutable global; concurrent requests cannot observe each
//!   other's chains
//! - Span closure is scoped acquisition: guards end spans on every exit
//!   path, errors included
//! - One tracer instance, injected at startup; the export channel is the
//!   only cross-task trace resource

pub mod context;
pub mod export;
pub mod span;
pub mod tracer;

pub use context::TraceContext;
pub use export::{CaptureExporter, ExportPipeline, HttpExporter, LogExporter, SpanExporter};
pub use span::{AttrValue, Span, SpanData, SpanGuard};
pub use tracer::{SpanParent, Tracer};

use std::sync::Arc;
use std::time::Duration;

use crate::config::ExporterConfig;

/// Construct the tracer and start its export worker.
///
/// Called once at startup; the returned tracer is injected into every
/// component that opens spans, and the pipeline's `shutdown` is the single
/// flush entry point.
pub fn install(
    config: &ExporterConfig,
    exporter: Box<dyn SpanExporter>,
) -> (Arc<Tracer>, ExportPipeline) {
    let (sink, pipeline) = ExportPipeline::start(
        exporter,
        config.max_batch,
        Duration::from_secs(config.flush_interval_secs),
    );
    let tracer = Tracer::new(&config.service_name, sink);
    (tracer, pipeline)
}
