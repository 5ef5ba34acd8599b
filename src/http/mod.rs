//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, middleware)
//!     → service::UserService (root span, orchestration)
//!     → JSON response (or plain-text 500)
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
