//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use user_service::config::ServiceConfig;
use user_service::http::HttpServer;
use user_service::lifecycle::ShutdownCoordinator;
use user_service::service::UserService;
use user_service::store::{Cache, MemoryCache, MemoryUserStore, UserStore};
use user_service::trace::{self, CaptureExporter, ExportPipeline};

/// A running service instance on an ephemeral port, with its trace capture
/// and lifecycle handles exposed for assertions.
pub struct TestApp {
    pub base_url: String,
    pub exporter: CaptureExporter,
    pub pipeline: Arc<ExportPipeline>,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub store: Arc<dyn UserStore>,
    pub server: JoinHandle<Result<(), std::io::Error>>,
}

impl TestApp {
    /// Flush captured spans without tearing the server down.
    pub async fn flush_spans(&self) {
        let _ = self.pipeline.shutdown().await;
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_cache(Arc::new(MemoryCache::new())).await
}

pub async fn spawn_app_with_cache(cache: Arc<dyn Cache>) -> TestApp {
    let config = ServiceConfig::default();
    let exporter = CaptureExporter::new();
    let (tracer, pipeline) = trace::install(&config.exporter, Box::new(exporter.clone()));

    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let users = Arc::new(UserService::new(tracer, cache, store.clone()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let coordinator = Arc::new(ShutdownCoordinator::new());

    let server = HttpServer::new(&config, users);
    let handle = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { server.run(listener, coordinator).await })
    };

    TestApp {
        base_url: format!("http://{addr}"),
        exporter,
        pipeline: Arc::new(pipeline),
        coordinator,
        store,
        server: handle,
    }
}
