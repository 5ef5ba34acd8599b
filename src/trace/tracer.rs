//! Span factory.
//!
//! One [`Tracer`] is constructed at startup by [`crate::trace::install`]
//! and injected (`Arc`) into every component that opens spans. There is no
//! process-wide tracer global.

use std::sync::Arc;

use uuid::Uuid;

use crate::trace::context::TraceContext;
use crate::trace::export::SpanSink;
use crate::trace::span::{Span, SpanGuard};

/// Parent selection for a new span.
pub enum SpanParent<'a> {
    /// No parent; the span begins a new trace.
    Root,
    /// Child of the given span, in the same trace.
    Child(&'a Span),
    /// Child of the context's active span; a root if the context is empty.
    FromContext(&'a TraceContext),
}

/// Creates root and child spans wired to the export pipeline.
pub struct Tracer {
    service_name: String,
    sink: SpanSink,
}

impl Tracer {
    pub(crate) fn new(service_name: &str, sink: SpanSink) -> Arc<Self> {
        Arc::new(Self {
            service_name: service_name.to_string(),
            sink,
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Start a span in the open state.
    pub fn span(&self, name: &str, parent: SpanParent<'_>) -> Span {
        let (trace_id, parent_span_id) = match parent {
            SpanParent::Root => (Uuid::new_v4(), None),
            SpanParent::Child(span) => (span.trace_id(), Some(span.span_id())),
            SpanParent::FromContext(ctx) => match ctx.active() {
                Some(span) => (span.trace_id(), Some(span.span_id())),
                None => (Uuid::new_v4(), None),
            },
        };
        Span::start(name, trace_id, parent_span_id, self.sink.clone())
    }

    /// Start a span wrapped in a guard that ends it on drop.
    pub fn scoped(&self, name: &str, parent: SpanParent<'_>) -> SpanGuard {
        SpanGuard::new(self.span(name, parent))
    }
}
