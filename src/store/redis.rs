//! Redis capsule store
//!
//! Capsule bytes live in a hash per record; two ZSETs index the records,
//! one scored by unlock timestamp (the due set the scheduler scans) and
//! one scored by creation timestamp (for newest-first listing). Claiming
//! is a `ZREM` on the due index: only the caller that observes the removal
//! proceeds with the delivery attempt.

use super::{CapsuleStore, Keys};
use crate::capsule::{Capsule, CapsuleStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fred::{
    interfaces::*,
    prelude::*,
    types::{RedisConfig, ReconnectPolicy},
};
use std::sync::Arc;

const POOL_SIZE: usize = 10;

/// Redis-backed capsule store
#[derive(Clone)]
pub struct RedisStore {
    pool: Arc<RedisPool>,
}

impl RedisStore {
    /// Connect to Redis and build the store
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let config = RedisConfig::from_url(&url)?;
        let pool = RedisPool::new(
            config,
            None,
            None,
            Some(ReconnectPolicy::default()),
            POOL_SIZE,
        )?;

        pool.init().await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Ping Redis
    pub async fn ping(&self) -> Result<String> {
        let result: String = self.pool.ping().await?;
        Ok(result)
    }

    async fn write_record(&self, capsule: &Capsule) -> Result<()> {
        let data = rmp_serde::to_vec(capsule).map_err(|e| Error::Serialization(e.to_string()))?;
        let key: RedisKey = Keys::capsule(&capsule.id).into();
        let values: Vec<(RedisKey, RedisValue)> =
            vec![("data".into(), RedisValue::Bytes(data.into()))];
        let _: u64 = self.pool.hset(key, values).await?;
        Ok(())
    }

    async fn load_record(&self, id: &str) -> Result<Option<Capsule>> {
        let key: RedisKey = Keys::capsule(id).into();
        let field: RedisKey = "data".into();
        let data: Option<RedisValue> = self.pool.hget(key, field).await?;

        let Some(data) = data else {
            return Ok(None);
        };
        let bytes = data
            .as_bytes()
            .ok_or_else(|| Error::Serialization("capsule data is not bytes".into()))?;
        let capsule: Capsule =
            rmp_serde::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(Some(capsule))
    }

    async fn index_due(&self, capsule: &Capsule) -> Result<()> {
        let due_key: RedisKey = Keys::due().into();
        let values: Vec<(f64, RedisValue)> = vec![(
            capsule.unlock_at.timestamp() as f64,
            capsule.id.as_str().into(),
        )];
        let _: () = self
            .pool
            .zadd(due_key, None, None, false, false, values)
            .await?;
        Ok(())
    }

    async fn unindex_due(&self, id: &str) -> Result<bool> {
        let due_key: RedisKey = Keys::due().into();
        let member: RedisValue = id.into();
        let removed: u64 = self.pool.zrem(due_key, member).await?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl CapsuleStore for RedisStore {
    async fn create(&self, capsule: Capsule) -> Result<Capsule> {
        self.write_record(&capsule).await?;

        let created_key: RedisKey = Keys::created().into();
        let values: Vec<(f64, RedisValue)> = vec![(
            capsule.created_at.timestamp() as f64,
            capsule.id.as_str().into(),
        )];
        let _: () = self
            .pool
            .zadd(created_key, None, None, false, false, values)
            .await?;

        if capsule.status == CapsuleStatus::Pending {
            self.index_due(&capsule).await?;
        }
        Ok(capsule)
    }

    async fn get(&self, id: &str) -> Result<Option<Capsule>> {
        self.load_record(id).await
    }

    async fn list(&self) -> Result<Vec<Capsule>> {
        let created_key: RedisKey = Keys::created().into();
        let ids: Vec<RedisValue> = self.pool.zrevrange(created_key, 0, -1, false).await?;

        let mut capsules = Vec::with_capacity(ids.len());
        for id in ids.into_iter().filter_map(|v| v.into_string()) {
            match self.load_record(&id).await? {
                Some(capsule) => capsules.push(capsule),
                None => tracing::warn!("Indexed capsule {} has no record", id),
            }
        }
        Ok(capsules)
    }

    async fn find_due_batch(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Capsule>> {
        let due_key: RedisKey = Keys::due().into();
        let ids: Vec<RedisValue> = self
            .pool
            .zrangebyscore(due_key, 0.0, now.timestamp() as f64, false, None)
            .await?;

        let mut capsules = Vec::new();
        for id in ids.into_iter().filter_map(|v| v.into_string()).take(limit) {
            match self.load_record(&id).await? {
                Some(capsule) => capsules.push(capsule),
                None => tracing::warn!("Due capsule {} has no record", id),
            }
        }
        Ok(capsules)
    }

    async fn claim(&self, capsule: &Capsule) -> Result<bool> {
        // ZREM returns the removal to exactly one concurrent caller
        self.unindex_due(&capsule.id).await
    }

    async fn release(&self, capsule: &Capsule) -> Result<()> {
        self.index_due(capsule).await
    }

    async fn save(&self, capsule: &Capsule) -> Result<()> {
        self.write_record(capsule).await?;

        if capsule.status == CapsuleStatus::Pending {
            self.index_due(capsule).await?;
        } else {
            self.unindex_due(&capsule.id).await?;
        }
        Ok(())
    }
}
