//! Span primitives.
//!
//! A [`Span`] is a timed, named unit of work. It stays mutable (attributes,
//! exception events) until [`Span::end`] fires, at which point an immutable
//! [`SpanData`] snapshot is handed to the export pipeline. `end` is
//! idempotent; later calls and later mutations are ignored, never panics.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

use crate::trace::export::SpanSink;

/// Scalar value attached to a span as an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

/// Exception event recorded on a span.
///
/// Purely observational: recording one never alters caller control flow.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionEvent {
    /// Display rendering of the error.
    pub message: String,
    /// Nanoseconds since the Unix epoch at which the event was recorded.
    pub timestamp_unix_nanos: u64,
}

/// Immutable snapshot of a finished span, as delivered to the exporter.
#[derive(Debug, Clone, Serialize)]
pub struct SpanData {
    pub trace_id: Uuid,
    pub span_id: Uuid,
    pub parent_span_id: Option<Uuid>,
    pub name: String,
    pub start_unix_nanos: u64,
    pub end_unix_nanos: u64,
    pub attributes: BTreeMap<String, AttrValue>,
    pub exceptions: Vec<ExceptionEvent>,
}

impl SpanData {
    /// Whether this span is the root of its trace.
    pub fn is_root(&self) -> bool {
        self.parent_span_id.is_none()
    }

    /// Look up an attribute by key.
    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Mutable portion of an open span, guarded by one lock.
struct SpanState {
    attributes: BTreeMap<String, AttrValue>,
    exceptions: Vec<ExceptionEvent>,
    ended: bool,
}

struct SpanInner {
    trace_id: Uuid,
    span_id: Uuid,
    parent_span_id: Option<Uuid>,
    name: String,
    start_unix_nanos: u64,
    // Monotonic start, so end >= start even if the wall clock steps back.
    started_at: Instant,
    state: Mutex<SpanState>,
    sink: SpanSink,
}

/// Handle to an open span. Cheap to clone; all clones refer to one span.
///
/// The span is owned by the task that created it until `end` submits the
/// snapshot to the export pipeline, the only cross-task trace resource.
#[derive(Clone)]
pub struct Span {
    inner: Arc<SpanInner>,
}

impl Span {
    pub(crate) fn start(
        name: &str,
        trace_id: Uuid,
        parent_span_id: Option<Uuid>,
        sink: SpanSink,
    ) -> Self {
        Self {
            inner: Arc::new(SpanInner {
                trace_id,
                span_id: Uuid::new_v4(),
                parent_span_id,
                name: name.to_string(),
                start_unix_nanos: now_unix_nanos(),
                started_at: Instant::now(),
                state: Mutex::new(SpanState {
                    attributes: BTreeMap::new(),
                    exceptions: Vec::new(),
                    ended: false,
                }),
                sink,
            }),
        }
    }

    pub fn trace_id(&self) -> Uuid {
        self.inner.trace_id
    }

    pub fn span_id(&self) -> Uuid {
        self.inner.span_id
    }

    pub fn parent_span_id(&self) -> Option<Uuid> {
        self.inner.parent_span_id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Attach metadata to the span. Ignored once the span has ended.
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<AttrValue>) {
        let Ok(mut state) = self.inner.state.lock() else {
            return;
        };
        if state.ended {
            tracing::debug!(span = %self.inner.name, "Attribute set after span end ignored");
            return;
        }
        state.attributes.insert(key.into(), value.into());
    }

    /// Append an exception event. Ignored once the span has ended.
    pub fn record_exception(&self, error: &dyn std::error::Error) {
        let Ok(mut state) = self.inner.state.lock() else {
            return;
        };
        if state.ended {
            return;
        }
        state.exceptions.push(ExceptionEvent {
            message: error.to_string(),
            timestamp_unix_nanos: now_unix_nanos(),
        });
    }

    /// Close the span and hand its snapshot to the export pipeline.
    ///
    /// Idempotent: only the first call takes effect, so it is safe to call
    /// from unconditional cleanup paths.
    pub fn end(&self) {
        let data = {
            let Ok(mut state) = self.inner.state.lock() else {
                return;
            };
            if state.ended {
                return;
            }
            state.ended = true;
            let elapsed = self.inner.started_at.elapsed().as_nanos() as u64;
            SpanData {
                trace_id: self.inner.trace_id,
                span_id: self.inner.span_id,
                parent_span_id: self.inner.parent_span_id,
                name: self.inner.name.clone(),
                start_unix_nanos: self.inner.start_unix_nanos,
                end_unix_nanos: self.inner.start_unix_nanos.saturating_add(elapsed),
                attributes: std::mem::take(&mut state.attributes),
                exceptions: std::mem::take(&mut state.exceptions),
            }
        };
        self.inner.sink.submit(data);
    }

    pub fn is_ended(&self) -> bool {
        self.inner
            .state
            .lock()
            .map(|state| state.ended)
            .unwrap_or(true)
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("trace_id", &self.inner.trace_id)
            .field("span_id", &self.inner.span_id)
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Scoped-acquisition wrapper: ends the wrapped span on drop.
///
/// Opening a span through a guard at the top of a handler block guarantees
/// closure on every exit path, including `?` propagation and early returns.
pub struct SpanGuard {
    span: Span,
}

impl SpanGuard {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Deref for SpanGuard {
    type Target = Span;

    fn deref(&self) -> &Span {
        &self.span
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.span.end();
    }
}

pub(crate) fn now_unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
