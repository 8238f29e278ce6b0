//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::config::{AppConfig, StorageBackend};
use crate::infrastructure::file_storage::JsonFileStorage;
use crate::infrastructure::memory_storage::MemoryStorage;
use crate::infrastructure::ports::{RecordStorage, RepoError};
use crate::use_cases::{ConflictPolicy, RecordStore};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub records: Arc<RecordStore>,
}

impl App {
    pub fn new(storage: Arc<dyn RecordStorage>, policy: ConflictPolicy) -> Self {
        Self {
            records: Arc::new(RecordStore::new(storage, policy)),
        }
    }

    /// Build the application with the storage backend named by `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, RepoError> {
        let storage: Arc<dyn RecordStorage> = match config.storage_backend {
            StorageBackend::File => {
                Arc::new(JsonFileStorage::new(&config.characters_dir).await?)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory record storage; records are lost on shutdown");
                Arc::new(MemoryStorage::new())
            }
        };
        Ok(Self::new(storage, config.conflict_policy))
    }
}
