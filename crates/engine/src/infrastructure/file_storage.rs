//! JSON file record storage.
//!
//! One pretty-printed `<key>.json` file per record in a single directory.
//! Writes go to a hidden temporary sibling first and are renamed into place,
//! so a crash never leaves a half-written record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use charsheet_domain::{sanitize, StorageKey};
use charsheet_shared::RecordBody;

use crate::infrastructure::ports::{RecordStorage, RepoError};

const RECORD_EXTENSION: &str = "json";

pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open the storage directory, creating it if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RepoError::database("create_dir", format!("{}: {e}", dir.display())))?;
        tracing::info!(dir = %dir.display(), "Record storage directory ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self, key: &StorageKey) -> PathBuf {
        self.dir.join(format!(".{key}.{RECORD_EXTENSION}.tmp"))
    }
}

#[async_trait]
impl RecordStorage for JsonFileStorage {
    async fn keys(&self) -> Result<Vec<StorageKey>, RepoError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| RepoError::database("keys", e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::database("keys", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            // Temp files are hidden; foreign files can't be addressed by a key.
            if stem.is_empty() || stem.starts_with('.') || sanitize(stem) != stem {
                tracing::debug!(file = %path.display(), "Ignoring non-record file");
                continue;
            }
            keys.push(StorageKey::from_name(stem));
        }
        Ok(keys)
    }

    async fn read(&self, key: &StorageKey) -> Result<Option<RecordBody>, RepoError> {
        let bytes = match tokio::fs::read(self.record_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepoError::database("read", e)),
        };

        match serde_json::from_slice::<serde_json::Value>(&bytes)
            .map_err(RepoError::serialization)?
        {
            serde_json::Value::Object(body) => Ok(Some(body)),
            _ => Err(RepoError::serialization("record is not a JSON object")),
        }
    }

    async fn write(&self, key: &StorageKey, body: &RecordBody) -> Result<(), RepoError> {
        let bytes = serde_json::to_vec_pretty(body).map_err(RepoError::serialization)?;
        let temp = self.temp_path(key);

        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| RepoError::database("write", e))?;

        if let Err(e) = tokio::fs::rename(&temp, self.record_path(key)).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                tracing::warn!(error = %cleanup, file = %temp.display(), "Failed to remove temp file");
            }
            return Err(RepoError::database("write", e));
        }
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<bool, RepoError> {
        match tokio::fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RepoError::database("remove", e)),
        }
    }

    async fn contains(&self, key: &StorageKey) -> Result<bool, RepoError> {
        tokio::fs::try_exists(self.record_path(key))
            .await
            .map_err(|e| RepoError::database("contains", e))
    }
}
