//! Relational user store collaborator.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Opaque relational protocol: parameterized insert returning the
/// generated identifier, plus lookup by identifier.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, name: &str, email: &str) -> Result<String, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<User>, StoreError>;
}

/// In-process user store backend with a monotonic id sequence.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: DashMap<String, User>,
    next_id: AtomicU64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, name: &str, email: &str) -> Result<String, StoreError> {
        tokio::task::yield_now().await;
        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        self.rows.insert(
            id.clone(),
            User {
                id: id.clone(),
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<User>, StoreError> {
        tokio::task::yield_now().await;
        Ok(self.rows.get(id).map(|row| row.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_returns_retrievable_id() {
        let store = MemoryUserStore::new();
        let id = store.insert("A", "a@x.com").await.unwrap();

        let user = store.get(&id).await.unwrap().unwrap();
        assert_eq!(user.name, "A");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn ids_are_distinct_and_sequential() {
        let store = MemoryUserStore::new();
        let first = store.insert("A", "a@x.com").await.unwrap();
        let second = store.insert("B", "b@x.com").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(first, "1");
        assert_eq!(second, "2");
    }

    #[tokio::test]
    async fn missing_id_yields_none() {
        let store = MemoryUserStore::new();
        assert!(store.get("999").await.unwrap().is_none());
    }
}
