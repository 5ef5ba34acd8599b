//! Explicit trace-context propagation.
//!
//! A [`TraceContext`] is an immutable value naming the currently active
//! span. Deriving a new active span produces a *new* context; the old one
//! is untouched. Contexts travel by argument through the call chain, so a
//! context built by one request task can never become visible to another —
//! isolation between concurrent requests is structural, not conventional.
//! There is no task-local or global active-span state anywhere.

use uuid::Uuid;

use crate::trace::span::Span;

/// Request-scoped handle to the currently active span.
#[derive(Clone, Debug, Default)]
pub struct TraceContext {
    active: Option<Span>,
}

impl TraceContext {
    /// A context with no active span. Spans started against it are roots.
    pub fn empty() -> Self {
        Self { active: None }
    }

    /// Derive a context in which `span` is active.
    ///
    /// Returns a new value; `self` keeps its previous active span, so the
    /// caller's view is restored for free once the derived context goes out
    /// of scope.
    pub fn with_span(&self, span: &Span) -> TraceContext {
        TraceContext {
            active: Some(span.clone()),
        }
    }

    /// The active span, if any.
    pub fn active(&self) -> Option<&Span> {
        self.active.as_ref()
    }

    /// Trace identifier of the active span, if any.
    pub fn trace_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(Span::trace_id)
    }
}
