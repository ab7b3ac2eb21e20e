//! In-memory capsule store
//!
//! The development and test backend. Records live in a map guarded by a
//! single async lock; a sorted due index mirrors the Redis backend's ZSET
//! so both backends select and claim capsules the same way.

use super::CapsuleStore;
use crate::capsule::{Capsule, CapsuleStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Shelf {
    records: HashMap<String, Capsule>,
    // (unlock timestamp, id): ordered by unlock time, ties broken by id
    due: BTreeSet<(i64, String)>,
}

/// In-memory capsule store
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Shelf>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_entry(capsule: &Capsule) -> (i64, String) {
        (capsule.unlock_at.timestamp(), capsule.id.clone())
    }
}

#[async_trait]
impl CapsuleStore for MemoryStore {
    async fn create(&self, capsule: Capsule) -> Result<Capsule> {
        let mut shelf = self.inner.write().await;
        if shelf.records.contains_key(&capsule.id) {
            return Err(Error::Store(format!("duplicate capsule id: {}", capsule.id)));
        }
        if capsule.status == CapsuleStatus::Pending {
            shelf.due.insert(Self::index_entry(&capsule));
        }
        shelf.records.insert(capsule.id.clone(), capsule.clone());
        Ok(capsule)
    }

    async fn get(&self, id: &str) -> Result<Option<Capsule>> {
        let shelf = self.inner.read().await;
        Ok(shelf.records.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Capsule>> {
        let shelf = self.inner.read().await;
        let mut capsules: Vec<Capsule> = shelf.records.values().cloned().collect();
        capsules.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(capsules)
    }

    async fn find_due_batch(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Capsule>> {
        let now_ts = now.timestamp();
        let shelf = self.inner.read().await;
        let capsules = shelf
            .due
            .iter()
            .take_while(|(unlock_ts, _)| *unlock_ts <= now_ts)
            .take(limit)
            .filter_map(|(_, id)| shelf.records.get(id).cloned())
            .collect();
        Ok(capsules)
    }

    async fn claim(&self, capsule: &Capsule) -> Result<bool> {
        let mut shelf = self.inner.write().await;
        Ok(shelf.due.remove(&Self::index_entry(capsule)))
    }

    async fn release(&self, capsule: &Capsule) -> Result<()> {
        let mut shelf = self.inner.write().await;
        shelf.due.insert(Self::index_entry(capsule));
        Ok(())
    }

    async fn save(&self, capsule: &Capsule) -> Result<()> {
        let mut shelf = self.inner.write().await;
        if !shelf.records.contains_key(&capsule.id) {
            return Err(Error::Store(format!("capsule not found: {}", capsule.id)));
        }
        let entry = Self::index_entry(capsule);
        if capsule.status == CapsuleStatus::Pending {
            shelf.due.insert(entry);
        } else {
            shelf.due.remove(&entry);
        }
        shelf.records.insert(capsule.id.clone(), capsule.clone());
        Ok(())
    }
}
