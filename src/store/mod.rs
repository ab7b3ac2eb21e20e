//! Storage layer
//!
//! Provides the capsule store abstraction and its backends. The scheduler
//! only ever talks to [`CapsuleStore`]; which backend sits behind it is a
//! startup-time configuration choice.

use crate::capsule::Capsule;
use crate::config::StoreDriver;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub mod keys;
pub mod memory;
pub mod redis;

pub use keys::Keys;
pub use memory::MemoryStore;
pub use redis::RedisStore;

/// Durable capsule storage.
///
/// `save` replaces one record's mutable delivery fields (`status`,
/// `sent_at`, `last_error`, `last_error_at`, `failure_count`) atomically
/// with respect to that record. Content fields never change after
/// `create`.
#[async_trait]
pub trait CapsuleStore: Send + Sync {
    /// Persist a newly created capsule and return it
    async fn create(&self, capsule: Capsule) -> Result<Capsule>;

    /// Load one capsule by id
    async fn get(&self, id: &str) -> Result<Option<Capsule>>;

    /// List all capsules, newest first
    async fn list(&self) -> Result<Vec<Capsule>>;

    /// Find up to `limit` pending capsules with `unlock_at <= now`,
    /// ordered by unlock time (ties broken by id)
    async fn find_due_batch(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Capsule>>;

    /// Atomically claim a due capsule for one delivery attempt.
    ///
    /// Returns `true` for exactly one caller per selection; a concurrent
    /// pass that also selected the capsule observes `false` and must skip
    /// it. A claimed capsule leaves the due set until `save` or `release`
    /// puts it back.
    async fn claim(&self, capsule: &Capsule) -> Result<bool>;

    /// Return a claimed capsule to the due set without saving state.
    ///
    /// Used when the attempt's outcome could not be persisted, so the
    /// capsule is picked up again on a later pass.
    async fn release(&self, capsule: &Capsule) -> Result<()>;

    /// Persist the mutable delivery fields of one capsule.
    ///
    /// A capsule that is still `pending` afterwards rejoins the due set;
    /// a terminal capsule does not.
    async fn save(&self, capsule: &Capsule) -> Result<()>;
}

/// Construct the configured store backend
pub async fn connect(driver: StoreDriver, redis_url: &str) -> Result<Arc<dyn CapsuleStore>> {
    match driver {
        StoreDriver::Memory => {
            tracing::info!("Using in-memory capsule store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreDriver::Redis => {
            let store = RedisStore::connect(redis_url).await?;
            tracing::info!("Connected to Redis capsule store");
            Ok(Arc::new(store))
        }
    }
}
