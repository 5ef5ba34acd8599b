//! Downstream storage collaborators.
//!
//! The cache and the relational user store are opaque request/response
//! services behind async traits. The default backends are in-process maps
//! so the service runs standalone; every call still crosses an await point
//! the way a real network client would, which is where request tasks
//! interleave.

pub mod cache;
pub mod users;

pub use cache::{Cache, MemoryCache};
pub use users::{MemoryUserStore, User, UserStore};

/// Errors from the downstream collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cache error: {0}")]
    Cache(String),

    #[error("database error: {0}")]
    Database(String),
}
