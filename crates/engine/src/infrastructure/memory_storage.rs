//! In-memory record storage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use charsheet_domain::StorageKey;
use charsheet_shared::RecordBody;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{RecordStorage, RepoError};

/// Record storage kept in process memory. Contents are lost on shutdown.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<BTreeMap<StorageKey, RecordBody>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStorage for MemoryStorage {
    async fn keys(&self) -> Result<Vec<StorageKey>, RepoError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn read(&self, key: &StorageKey) -> Result<Option<RecordBody>, RepoError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn write(&self, key: &StorageKey, body: &RecordBody) -> Result<(), RepoError> {
        self.records.write().await.insert(key.clone(), body.clone());
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<bool, RepoError> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn contains(&self, key: &StorageKey) -> Result<bool, RepoError> {
        Ok(self.records.read().await.contains_key(key))
    }
}
