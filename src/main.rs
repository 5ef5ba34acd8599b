//! Traced user service binary.
//!
//! Startup order: config, logging, metrics, trace pipeline, storage
//! backends, listener, signal handling, server. After the server drains,
//! the coordinator flushes the trace pipeline once and the process exits 0.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use user_service::config::{self, ServiceConfig};
use user_service::http::HttpServer;
use user_service::lifecycle::{signals, ShutdownCoordinator};
use user_service::observability::{logging, metrics};
use user_service::service::UserService;
use user_service::store::{Cache, MemoryCache, MemoryUserStore, UserStore};
use user_service::trace::{self, HttpExporter, LogExporter, SpanExporter};

#[derive(Debug, Parser)]
#[command(name = "user-service", about = "Traced user read/create service")]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        service_name = %config.exporter.service_name,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(err) => tracing::error!(
                error = %err,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let exporter: Box<dyn SpanExporter> = match &config.exporter.endpoint {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Exporting traces to collector");
            Box::new(HttpExporter::new(
                endpoint.clone(),
                config.exporter.service_name.clone(),
            ))
        }
        None => {
            tracing::info!("No collector endpoint configured, logging finished spans");
            Box::new(LogExporter)
        }
    };
    let (tracer, pipeline) = trace::install(&config.exporter, exporter);

    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
    let users = Arc::new(UserService::new(tracer, cache, store));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let coordinator = Arc::new(ShutdownCoordinator::new());
    tokio::spawn(signals::listen(coordinator.clone()));

    let server = HttpServer::new(&config, users);
    server.run(listener, coordinator.clone()).await?;

    coordinator.finalize(&pipeline).await;
    tracing::info!("Shutdown complete");
    Ok(())
}
