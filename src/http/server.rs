//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create the Axum router with the three user endpoints
//! - Wire up middleware (request tracing, timeout)
//! - Serve with graceful shutdown driven by the lifecycle coordinator
//!
//! Handlers never propagate errors to the framework: every failure inside
//! a traced block has already been recorded on the request's root span by
//! the orchestrator, and is mapped here to the plain-text 500 contract.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::rejection::JsonRejection,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::lifecycle::ShutdownCoordinator;
use crate::observability::metrics;
use crate::service::{CreateUser, UserService};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
}

/// HTTP server for the user service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and wiring.
    pub fn new(config: &ServiceConfig, users: Arc<UserService>) -> Self {
        let state = AppState { users };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/getuser", get(get_static_user))
            .route("/user", get(get_user))
            .route("/create-user", post(create_user))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the coordinator enters `Draining`, then finish in-flight
    /// requests and return.
    pub async fn run(
        self,
        listener: TcpListener,
        coordinator: Arc<ShutdownCoordinator>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = async move { coordinator.draining().await };
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// GET /getuser — static record, no downstream I/O.
async fn get_static_user(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let response = Json(state.users.static_user()).into_response();
    metrics::record_request("GET", "/getuser", response.status().as_u16(), start);
    response
}

/// GET /user — cache-aside read keyed by the optional `userId` query param.
async fn get_user(State(state): State<AppState>, Query(query): Query<UserQuery>) -> Response {
    let start = Instant::now();
    let response = match state.users.fetch_user(query.user_id).await {
        Ok(user) => Json(user).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "User lookup failed");
            internal_error()
        }
    };
    metrics::record_request("GET", "/user", response.status().as_u16(), start);
    response
}

/// POST /create-user — traced insert returning the generated identifier.
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let response = match body {
        Ok(Json(request)) => match state.users.create_user(request).await {
            Ok(id) => Json(id).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "User creation failed");
                internal_error()
            }
        },
        Err(rejection) => {
            // A body that never deserialized gets the same generic 500 as
            // a failed insert.
            tracing::warn!(error = %rejection, "Malformed create-user body");
            internal_error()
        }
    };
    metrics::record_request("POST", "/create-user", response.status().as_u16(), start);
    response
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
