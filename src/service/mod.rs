//! Request orchestration.
//!
//! # Data Flow
//! ```text
//! http handler
//!     → users.rs orchestrator (root span, context derivation)
//!     → store traits (child span per downstream call)
//!     → Result<value, ServiceError> back to the handler
//! ```
//!
//! # Design Decisions
//! - Errors travel as values; recording them on a span is a side effect of
//!   the error path, never part of control flow
//! - Every span is closed by guard before the orchestrator returns

pub mod users;

pub use users::{CreateUser, UserService, DEFAULT_USER_ID};

use crate::store::StoreError;

/// Per-request failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
