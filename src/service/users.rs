//! User read/create orchestrators.
//!
//! Each operation opens a root span, derives a trace context, and wraps
//! every downstream call in a guarded child span, so the span tree for a
//! request is complete whether the request succeeds or fails.

use std::sync::Arc;

use serde::Deserialize;

use crate::observability::metrics;
use crate::service::ServiceError;
use crate::store::{Cache, User, UserStore};
use crate::trace::{SpanParent, TraceContext, Tracer};

/// Key used when the read endpoint receives no `userId`.
pub const DEFAULT_USER_ID: &str = "defaultUserId";

const DEFAULT_NAME: &str = "John Doe";
const DEFAULT_EMAIL: &str = "john.doe@example.com";

/// Body of a create request. Fields are optional so absence is reported
/// through the service error path rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Orchestrates the traced user operations.
pub struct UserService {
    tracer: Arc<Tracer>,
    cache: Arc<dyn Cache>,
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(tracer: Arc<Tracer>, cache: Arc<dyn Cache>, store: Arc<dyn UserStore>) -> Self {
        Self {
            tracer,
            cache,
            store,
        }
    }

    /// Cache-aside read: check the cache, synthesize and write back on a
    /// miss. Root span `get-single-user`, child span `redis-get`.
    pub async fn fetch_user(&self, user_id: Option<String>) -> Result<User, ServiceError> {
        let user_id = user_id.unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let root = self.tracer.scoped("get-single-user", SpanParent::Root);
        root.set_attribute("user.id", user_id.as_str());
        let ctx = TraceContext::empty().with_span(root.span());

        match self.read_through(&ctx, &user_id).await {
            Ok(user) => Ok(user),
            Err(err) => {
                root.record_exception(&err);
                Err(err)
            }
        }
        // root guard drops here, closing the span on every path
    }

    async fn read_through(
        &self,
        ctx: &TraceContext,
        user_id: &str,
    ) -> Result<User, ServiceError> {
        let cached = {
            let span = self.tracer.scoped("redis-get", SpanParent::FromContext(ctx));
            match self.cache.get(user_id).await? {
                Some(raw) => {
                    span.set_attribute("cache.hit", true);
                    metrics::record_cache_lookup(true);
                    Some(serde_json::from_str::<User>(&raw)?)
                }
                None => {
                    span.set_attribute("cache.hit", false);
                    metrics::record_cache_lookup(false);
                    None
                }
            }
            // guard drop closes redis-get, also when `?` bailed out above
        };

        if let Some(user) = cached {
            return Ok(user);
        }

        // Miss: synthesize the default record and write it back as part of
        // the same fallback step (no separate span). Two concurrent misses
        // for one key both write; the last writer wins.
        let user = User {
            id: user_id.to_string(),
            name: DEFAULT_NAME.to_string(),
            email: DEFAULT_EMAIL.to_string(),
        };
        self.cache
            .set(user_id, serde_json::to_string(&user)?)
            .await?;
        Ok(user)
    }

    /// Traced insert: root span `create-user`, child span `pg-insert`
    /// around the parameterized insert. Returns the generated identifier.
    pub async fn create_user(&self, request: CreateUser) -> Result<String, ServiceError> {
        let root = self.tracer.scoped("create-user", SpanParent::Root);
        let ctx = TraceContext::empty().with_span(root.span());

        match self.insert_user(&ctx, request).await {
            Ok(id) => Ok(id),
            Err(err) => {
                root.record_exception(&err);
                Err(err)
            }
        }
    }

    async fn insert_user(
        &self,
        ctx: &TraceContext,
        request: CreateUser,
    ) -> Result<String, ServiceError> {
        let name = request
            .name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("name is required".to_string()))?;
        let email = request
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| ServiceError::InvalidInput("email is required".to_string()))?;

        let _span = self.tracer.scoped("pg-insert", SpanParent::FromContext(ctx));
        let id = self.store.insert(&name, &email).await?;
        Ok(id)
    }

    /// Static record for `/getuser`; no downstream I/O.
    pub fn static_user(&self) -> User {
        let span = self.tracer.scoped("/getuser", SpanParent::Root);
        let user = User {
            id: "1".to_string(),
            name: DEFAULT_NAME.to_string(),
            email: DEFAULT_EMAIL.to_string(),
        };
        span.set_attribute("user.id", user.id.as_str());
        span.set_attribute("user.name", user.name.as_str());
        user
    }
}
