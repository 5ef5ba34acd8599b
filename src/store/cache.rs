//! Key/value cache collaborator.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::store::StoreError;

/// Opaque cache protocol: `GET key` and `SET key value`.
///
/// Values are opaque strings (the service stores serialized user records).
/// No TTL, no versioning; a `set` unconditionally replaces the entry, so
/// the last writer wins.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process cache backend.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        // Suspension point, as a network round trip would be.
        tokio::task::yield_now().await;
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
