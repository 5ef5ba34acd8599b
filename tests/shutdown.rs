//! Shutdown properties: in-flight requests drain, the trace flush happens
//! exactly once, duplicate signals are no-ops, and the coordinator reaches
//! its terminal state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use user_service::lifecycle::LifecycleState;
use user_service::store::{Cache, MemoryCache, StoreError};

mod common;

use common::spawn_app_with_cache;

/// Cache double that holds every lookup long enough for the test to send a
/// termination signal while requests are in flight.
struct SlowCache {
    inner: MemoryCache,
    delay: Duration,
    lookups_started: Arc<AtomicUsize>,
}

impl SlowCache {
    fn new(delay: Duration) -> (Self, Arc<AtomicUsize>) {
        let lookups_started = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: MemoryCache::new(),
                delay,
                lookups_started: lookups_started.clone(),
            },
            lookups_started,
        )
    }
}

#[async_trait]
impl Cache for SlowCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.lookups_started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.inner.set(key, value).await
    }
}

#[tokio::test]
async fn shutdown_drains_in_flight_requests_and_flushes_once() {
    let in_flight: usize = 4;
    let (cache, lookups_started) = SlowCache::new(Duration::from_millis(200));
    let app = spawn_app_with_cache(Arc::new(cache)).await;
    let client = reqwest::Client::new();

    let mut requests = Vec::new();
    for i in 0..in_flight {
        let client = client.clone();
        let url = format!("{}/user?userId=u{i}", app.base_url);
        requests.push(tokio::spawn(async move {
            client.get(url).send().await.unwrap().status().as_u16()
        }));
    }

    // Signal only once every request has reached its cache lookup.
    while lookups_started.load(Ordering::SeqCst) < in_flight {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(app.coordinator.begin());
    // A second signal during drain is a no-op.
    assert!(!app.coordinator.begin());
    assert_eq!(app.coordinator.state(), LifecycleState::Draining);

    for request in requests {
        assert_eq!(request.await.unwrap(), 200, "in-flight request completed");
    }
    app.server.await.unwrap().unwrap();

    app.coordinator.finalize(&app.pipeline).await;
    assert_eq!(app.coordinator.state(), LifecycleState::Terminated);
    assert_eq!(app.exporter.export_calls(), 1);
    // Root and child span for each drained request.
    assert_eq!(app.exporter.finished_spans().len(), in_flight * 2);

    // Running the post-drain sequence again neither re-flushes nor moves
    // the state machine.
    app.coordinator.finalize(&app.pipeline).await;
    assert_eq!(app.exporter.export_calls(), 1);
    assert_eq!(app.coordinator.state(), LifecycleState::Terminated);
}

#[tokio::test]
async fn idle_server_shuts_down_promptly() {
    let app = spawn_app_with_cache(Arc::new(MemoryCache::new())).await;

    assert!(app.coordinator.begin());
    app.server.await.unwrap().unwrap();

    app.coordinator.finalize(&app.pipeline).await;
    assert_eq!(app.coordinator.state(), LifecycleState::Terminated);
}
