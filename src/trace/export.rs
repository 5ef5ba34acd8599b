//! Span export pipeline.
//!
//! Finished spans are submitted over an unbounded channel to a single
//! worker task, which batches them and hands batches to a [`SpanExporter`].
//! The channel is the only trace state shared across request tasks; the
//! worker serializes all exports.
//!
//! [`ExportPipeline::shutdown`] flushes buffered spans exactly once and
//! stops the worker. Export failure during shutdown is reported to the
//! caller but never escalated into a crash.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::trace::span::SpanData;

/// Errors from the export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("collector request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector returned status {0}")]
    Status(u16),

    #[error("export worker unavailable")]
    WorkerGone,
}

/// Delivers span batches to a collector.
#[async_trait]
pub trait SpanExporter: Send + Sync {
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError>;
}

pub(crate) enum ExportMsg {
    Span(SpanData),
    Flush(oneshot::Sender<Result<(), ExportError>>),
}

/// Submission handle held by every span.
#[derive(Clone)]
pub(crate) struct SpanSink {
    tx: mpsc::UnboundedSender<ExportMsg>,
}

impl SpanSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ExportMsg>) -> Self {
        Self { tx }
    }

    /// Hand a finished span to the worker. Spans ended after the pipeline
    /// has stopped are dropped silently; the process is exiting.
    pub(crate) fn submit(&self, data: SpanData) {
        if self.tx.send(ExportMsg::Span(data)).is_err() {
            tracing::trace!("Span finished after export pipeline stopped, dropping");
        }
    }
}

/// Handle to the export worker; owns the single shutdown entry point.
pub struct ExportPipeline {
    tx: mpsc::UnboundedSender<ExportMsg>,
    worker: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl ExportPipeline {
    pub(crate) fn start(
        exporter: Box<dyn SpanExporter>,
        max_batch: usize,
        flush_interval: Duration,
    ) -> (SpanSink, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(rx, exporter, max_batch, flush_interval));
        let pipeline = Self {
            tx: tx.clone(),
            worker: Mutex::new(Some(worker)),
            shut_down: AtomicBool::new(false),
        };
        (SpanSink::new(tx), pipeline)
    }

    /// Flush buffered spans and stop the worker.
    ///
    /// The flush happens at most once for the lifetime of the pipeline;
    /// every later call (including concurrent ones) is a no-op returning
    /// `Ok`.
    pub async fn shutdown(&self) -> Result<(), ExportError> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(ExportMsg::Flush(ack_tx)).is_err() {
            return Err(ExportError::WorkerGone);
        }
        let result = ack_rx.await.unwrap_or(Err(ExportError::WorkerGone));

        let worker = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = worker {
            let _ = handle.await;
        }
        result
    }

    /// Whether the one-shot flush has already been taken.
    pub fn has_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<ExportMsg>,
    exporter: Box<dyn SpanExporter>,
    max_batch: usize,
    flush_interval: Duration,
) {
    let mut buffer: Vec<SpanData> = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(ExportMsg::Span(data)) => {
                    buffer.push(data);
                    if buffer.len() >= max_batch {
                        let _ = export_batch(&mut buffer, &*exporter).await;
                    }
                }
                Some(ExportMsg::Flush(ack)) => {
                    // Spans ended before the flush request are already
                    // queued; pull them into the buffer before exporting.
                    while let Ok(ExportMsg::Span(data)) = rx.try_recv() {
                        buffer.push(data);
                    }
                    let result = export_batch(&mut buffer, &*exporter).await;
                    let _ = ack.send(result);
                    break;
                }
                None => {
                    let _ = export_batch(&mut buffer, &*exporter).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                let _ = export_batch(&mut buffer, &*exporter).await;
            }
        }
    }
    tracing::debug!("Export worker stopped");
}

async fn export_batch(
    buffer: &mut Vec<SpanData>,
    exporter: &dyn SpanExporter,
) -> Result<(), ExportError> {
    if buffer.is_empty() {
        return Ok(());
    }
    let batch = std::mem::take(buffer);
    let count = batch.len();
    match exporter.export(batch).await {
        Ok(()) => {
            tracing::debug!(spans = count, "Exported span batch");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, spans = count, "Span export failed");
            Err(err)
        }
    }
}

/// Exports span batches as JSON over HTTP to a static collector endpoint.
pub struct HttpExporter {
    client: reqwest::Client,
    endpoint: String,
    service_name: String,
}

#[derive(Serialize)]
struct ExportPayload<'a> {
    service_name: &'a str,
    spans: &'a [SpanData],
}

impl HttpExporter {
    pub fn new(endpoint: String, service_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            service_name,
        }
    }
}

#[async_trait]
impl SpanExporter for HttpExporter {
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        let payload = ExportPayload {
            service_name: &self.service_name,
            spans: &batch,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ExportError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Fallback exporter used when no collector endpoint is configured.
#[derive(Default)]
pub struct LogExporter;

#[async_trait]
impl SpanExporter for LogExporter {
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        for span in &batch {
            tracing::debug!(
                trace_id = %span.trace_id,
                span_id = %span.span_id,
                name = %span.name,
                "Finished span"
            );
        }
        Ok(())
    }
}

/// In-memory exporter for tests: records every finished span and counts
/// non-empty export calls.
#[derive(Clone, Default)]
pub struct CaptureExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
    export_calls: Arc<AtomicUsize>,
}

impl CaptureExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpanExporter for CaptureExporter {
    async fn export(&self, batch: Vec<SpanData>) -> Result<(), ExportError> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut spans) = self.spans.lock() {
            spans.extend(batch);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_sink() -> (SpanSink, SpanReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SpanSink::new(tx), SpanReceiver(rx))
}

/// Test-side receiver that surfaces only span submissions.
#[cfg(test)]
pub(crate) struct SpanReceiver(mpsc::UnboundedReceiver<ExportMsg>);

#[cfg(test)]
impl SpanReceiver {
    pub(crate) fn try_recv(&mut self) -> Result<SpanData, ()> {
        loop {
            match self.0.try_recv() {
                Ok(ExportMsg::Span(data)) => return Ok(data),
                Ok(ExportMsg::Flush(_)) => continue,
                Err(_) => return Err(()),
            }
        }
    }
}
