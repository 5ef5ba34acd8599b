//! Traced user service.
//!
//! A small HTTP service exposing user read/create endpoints, where every
//! request produces a causally linked span tree that is flushed to a
//! collector during graceful shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request        ┌──────────────────────────────────────────────┐
//!   ─────────────────────▶│  http        service           store         │
//!                         │  server ───▶ orchestrators ──▶ cache / users │
//!                         │    │             │                           │
//!                         │    │        root + child spans              │
//!                         │    │             ▼                           │
//!   Client Response       │    │         trace::export ──▶ collector    │
//!   ◀─────────────────────│    ▼             ▲                           │
//!                         │  lifecycle ──────┘ (one flush at shutdown)   │
//!                         │  config / observability (cross-cutting)      │
//!                         └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod service;
pub mod store;
pub mod trace;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::ShutdownCoordinator;
pub use service::UserService;
