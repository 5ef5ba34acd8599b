//! Span-tree properties: single-rooted trees per request, once-only span
//! closure, and isolation between concurrently processed requests.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use uuid::Uuid;

use user_service::config::ExporterConfig;
use user_service::service::UserService;
use user_service::store::{MemoryCache, MemoryUserStore};
use user_service::trace::{self, AttrValue, CaptureExporter, ExportPipeline, SpanData};

fn build_service() -> (Arc<UserService>, CaptureExporter, ExportPipeline) {
    let exporter = CaptureExporter::new();
    let (tracer, pipeline) =
        trace::install(&ExporterConfig::default(), Box::new(exporter.clone()));
    let service = Arc::new(UserService::new(
        tracer,
        Arc::new(MemoryCache::new()),
        Arc::new(MemoryUserStore::new()),
    ));
    (service, exporter, pipeline)
}

fn by_trace(spans: &[SpanData]) -> HashMap<Uuid, Vec<&SpanData>> {
    let mut traces: HashMap<Uuid, Vec<&SpanData>> = HashMap::new();
    for span in spans {
        traces.entry(span.trace_id).or_default().push(span);
    }
    traces
}

#[tokio::test]
async fn request_produces_single_rooted_tree() {
    let (service, exporter, pipeline) = build_service();

    service.fetch_user(Some("u-1".to_string())).await.unwrap();
    pipeline.shutdown().await.unwrap();

    let spans = exporter.finished_spans();
    assert_eq!(spans.len(), 2);

    let root = spans
        .iter()
        .find(|span| span.name == "get-single-user")
        .unwrap();
    let child = spans.iter().find(|span| span.name == "redis-get").unwrap();

    assert!(root.is_root());
    assert_eq!(child.trace_id, root.trace_id);
    assert_eq!(child.parent_span_id, Some(root.span_id));
}

#[tokio::test]
async fn every_span_ends_exactly_once_with_valid_times() {
    let (service, exporter, pipeline) = build_service();

    for i in 0..3 {
        service.fetch_user(Some(format!("u-{i}"))).await.unwrap();
    }
    pipeline.shutdown().await.unwrap();

    let spans = exporter.finished_spans();
    // Two spans per miss-path request, each exported exactly once.
    assert_eq!(spans.len(), 6);
    let distinct: HashSet<Uuid> = spans.iter().map(|span| span.span_id).collect();
    assert_eq!(distinct.len(), spans.len());

    for span in &spans {
        assert!(span.end_unix_nanos >= span.start_unix_nanos);
    }
}

#[tokio::test]
async fn concurrent_requests_have_isolated_traces() {
    let (service, exporter, pipeline) = build_service();
    let count: usize = 8;

    let tasks: Vec<_> = (0..count)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .fetch_user(Some(format!("user-{i}")))
                    .await
                    .unwrap()
            })
        })
        .collect();
    for result in join_all(tasks).await {
        result.unwrap();
    }
    pipeline.shutdown().await.unwrap();

    let spans = exporter.finished_spans();
    let traces = by_trace(&spans);
    assert_eq!(traces.len(), count, "one trace per request");

    let mut seen_user_ids = HashSet::new();
    for members in traces.values() {
        let roots: Vec<_> = members.iter().filter(|span| span.is_root()).collect();
        assert_eq!(roots.len(), 1, "exactly one root per trace");
        let root = roots[0];
        assert_eq!(root.name, "get-single-user");

        // Every non-root span in the trace hangs off that request's root;
        // nothing points at a span from an unrelated request.
        for span in members.iter().filter(|span| !span.is_root()) {
            assert_eq!(span.name, "redis-get");
            assert_eq!(span.parent_span_id, Some(root.span_id));
        }

        match root.attribute("user.id") {
            Some(AttrValue::Str(user_id)) => {
                assert!(seen_user_ids.insert(user_id.clone()), "attribute leaked");
            }
            other => panic!("root missing user.id attribute: {other:?}"),
        }
    }
    assert_eq!(seen_user_ids.len(), count);
}
