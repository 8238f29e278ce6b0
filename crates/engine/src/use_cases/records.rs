//! Record store use cases.
//!
//! Keyed persistence of character records with name-conflict protection.
//! Every key received from a caller is sanitized before it reaches storage,
//! and every operation holds the store-wide lock so check-then-write
//! sequences are atomic for concurrent callers.

use std::sync::Arc;

use charsheet_domain::StorageKey;
use charsheet_shared::{CharacterListResponse, CharacterSummary, RecordBody, SkippedRecord};
use tokio::sync::Mutex;

use crate::infrastructure::ports::{RecordStorage, RepoError};

/// How a save without a `current` key treats an existing record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Overwrite the existing record. Matches clients that never send a
    /// current key.
    #[default]
    Compatible,
    /// Refuse: only the owner of a record (a matching current key) may
    /// overwrite it.
    Strict,
}

impl ConflictPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compatible" => Some(Self::Compatible),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compatible => "compatible",
            Self::Strict => "strict",
        }
    }
}

/// Record store operations.
pub struct RecordStore {
    storage: Arc<dyn RecordStorage>,
    policy: ConflictPolicy,
    lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn RecordStorage>, policy: ConflictPolicy) -> Self {
        Self {
            storage,
            policy,
            lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Summaries of every stored record, ordered by storage key.
    ///
    /// Records that cannot be read are logged and reported in `skipped`
    /// instead of failing the whole listing.
    pub async fn list(&self) -> Result<CharacterListResponse, RecordStoreError> {
        let _guard = self.lock.lock().await;

        let mut keys = self.storage.keys().await?;
        keys.sort();

        let mut listing = CharacterListResponse::default();
        for key in keys {
            match self.storage.read(&key).await {
                Ok(Some(body)) => listing
                    .characters
                    .push(CharacterSummary::from_record(key.as_str(), &body)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(storage_key = %key, error = %e, "Skipping unreadable record");
                    listing.skipped.push(SkippedRecord {
                        storage_key: key.into_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(listing)
    }

    /// The stored body at `key`.
    pub async fn get(&self, key: &str) -> Result<RecordBody, RecordStoreError> {
        let key = storage_key(key)?;
        let _guard = self.lock.lock().await;

        match self.storage.read(&key).await? {
            Some(body) => Ok(body),
            None => Err(RecordStoreError::NotFound(key)),
        }
    }

    /// Create or overwrite the record at `key`.
    ///
    /// `current` names the record the caller is editing. Overwriting a record
    /// the caller does not own is a conflict; see [`ConflictPolicy`] for
    /// callers that send no current key.
    pub async fn put(
        &self,
        key: &str,
        body: RecordBody,
        current: Option<&str>,
    ) -> Result<StorageKey, RecordStoreError> {
        let key = storage_key(key)?;
        let current = current
            .filter(|current| !current.is_empty())
            .map(StorageKey::from_name);
        let _guard = self.lock.lock().await;

        if self.storage.contains(&key).await? {
            let owned = match &current {
                Some(current) => *current == key,
                None => self.policy == ConflictPolicy::Compatible,
            };
            if !owned {
                tracing::info!(
                    storage_key = %key,
                    current = ?current.as_ref().map(StorageKey::as_str),
                    "Refusing to overwrite record owned by another name"
                );
                return Err(RecordStoreError::Conflict(key));
            }
        }

        self.storage.write(&key, &body).await?;
        tracing::debug!(storage_key = %key, "Saved record");
        Ok(key)
    }

    /// Move the record at `old_key` to `new_key`, merging `body` over it.
    ///
    /// Top-level fields of `body` replace stored ones. The stored `name` is
    /// kept unless `body` carries a non-empty one. If the old record cannot
    /// be removed after the new one is written, the new copy is rolled back.
    pub async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        body: RecordBody,
    ) -> Result<StorageKey, RecordStoreError> {
        let old_key = storage_key(old_key)?;
        let new_key = storage_key(new_key)?;
        let _guard = self.lock.lock().await;

        let mut record = self
            .storage
            .read(&old_key)
            .await?
            .ok_or_else(|| RecordStoreError::NotFound(old_key.clone()))?;

        let moving = old_key != new_key;
        if moving && self.storage.contains(&new_key).await? {
            tracing::info!(
                old_key = %old_key,
                new_key = %new_key,
                "Refusing rename onto an existing record"
            );
            return Err(RecordStoreError::Conflict(new_key));
        }

        merge_record(&mut record, body);
        self.storage.write(&new_key, &record).await?;

        if moving {
            if let Err(e) = self.storage.remove(&old_key).await {
                tracing::error!(
                    old_key = %old_key,
                    new_key = %new_key,
                    error = %e,
                    "Failed to remove old record, rolling back rename"
                );
                if let Err(rollback) = self.storage.remove(&new_key).await {
                    tracing::error!(
                        storage_key = %new_key,
                        error = %rollback,
                        "Failed to roll back renamed record"
                    );
                }
                return Err(e.into());
            }
        }

        tracing::info!(old_key = %old_key, new_key = %new_key, "Renamed record");
        Ok(new_key)
    }

    pub async fn exists(&self, key: &str) -> Result<bool, RecordStoreError> {
        let key = StorageKey::from_name(key);
        if key.is_empty() {
            return Ok(false);
        }
        let _guard = self.lock.lock().await;
        Ok(self.storage.contains(&key).await?)
    }

    pub async fn delete(&self, key: &str) -> Result<(), RecordStoreError> {
        let key = storage_key(key)?;
        let _guard = self.lock.lock().await;

        if !self.storage.remove(&key).await? {
            return Err(RecordStoreError::NotFound(key));
        }
        tracing::info!(storage_key = %key, "Deleted record");
        Ok(())
    }
}

fn storage_key(raw: &str) -> Result<StorageKey, RecordStoreError> {
    let key = StorageKey::from_name(raw);
    if key.is_empty() {
        return Err(RecordStoreError::EmptyKey);
    }
    Ok(key)
}

/// Shallow merge, body fields winning. An empty or missing `name` in the body
/// keeps the stored name rather than blanking it.
fn merge_record(record: &mut RecordBody, body: RecordBody) {
    let stored_name = record.get("name").cloned();
    let body_has_name = body
        .get("name")
        .and_then(|name| name.as_str())
        .is_some_and(|name| !name.is_empty());

    record.extend(body);

    if !body_has_name {
        match stored_name {
            Some(name) => {
                record.insert("name".to_string(), name);
            }
            None => {
                record.remove("name");
            }
        }
    }
}

/// Errors that can occur during record store operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Character not found: {0}")]
    NotFound(StorageKey),

    #[error("A character with this name already exists: {0}")]
    Conflict(StorageKey),

    #[error("Storage key must not be empty")]
    EmptyKey,

    #[error("Repository error: {0}")]
    Storage(#[from] RepoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_storage::MemoryStorage;
    use crate::infrastructure::ports::MockRecordStorage;
    use mockall::predicate::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> RecordBody {
        match value {
            serde_json::Value::Object(map) => map,
            _ => RecordBody::new(),
        }
    }

    fn store() -> RecordStore {
        RecordStore::new(Arc::new(MemoryStorage::new()), ConflictPolicy::Compatible)
    }

    #[test]
    fn parses_conflict_policy() {
        assert_eq!(ConflictPolicy::parse("strict"), Some(ConflictPolicy::Strict));
        assert_eq!(
            ConflictPolicy::parse(" Compatible "),
            Some(ConflictPolicy::Compatible)
        );
        assert_eq!(ConflictPolicy::parse("lenient"), None);
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = store();
        let record = body(json!({"name": "Thorin Oakenshield!", "class": "Fighter"}));

        let key = store
            .put("Thorin Oakenshield!", record.clone(), None)
            .await
            .expect("put");

        assert_eq!(key.as_str(), "Thorin_Oakenshield_");
        assert_eq!(store.get("Thorin_Oakenshield_").await.expect("get"), record);
        assert!(store.exists("Thorin Oakenshield!").await.expect("exists"));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = store().get("nobody").await.expect_err("missing");
        assert!(matches!(err, RecordStoreError::NotFound(key) if key.as_str() == "nobody"));
    }

    #[tokio::test]
    async fn put_conflicts_when_current_key_differs() {
        let store = store();
        store
            .put("Aria", body(json!({"name": "Aria", "level": 5})), None)
            .await
            .expect("seed");

        let err = store
            .put("Aria", body(json!({"name": "Aria", "level": 1})), Some("Bran"))
            .await
            .expect_err("conflict");
        assert!(matches!(err, RecordStoreError::Conflict(_)));

        let stored = store.get("Aria").await.expect("get");
        assert_eq!(stored.get("level"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn put_allows_owner_to_overwrite() {
        let store = store();
        store
            .put("Aria", body(json!({"level": 5})), None)
            .await
            .expect("seed");

        store
            .put("Aria", body(json!({"level": 6})), Some("Aria"))
            .await
            .expect("owner overwrite");

        let stored = store.get("Aria").await.expect("get");
        assert_eq!(stored.get("level"), Some(&json!(6)));
    }

    #[tokio::test]
    async fn current_key_is_sanitized_before_comparing() {
        let store = store();
        store
            .put("Aria Stormborn", RecordBody::new(), None)
            .await
            .expect("seed");

        store
            .put("Aria_Stormborn", RecordBody::new(), Some("Aria Stormborn"))
            .await
            .expect("same key after sanitizing");
    }

    #[tokio::test]
    async fn absent_current_key_follows_policy() {
        let compatible = store();
        compatible
            .put("Aria", RecordBody::new(), None)
            .await
            .expect("seed");
        compatible
            .put("Aria", RecordBody::new(), None)
            .await
            .expect("compatible overwrites");
        compatible
            .put("Aria", RecordBody::new(), Some(""))
            .await
            .expect("empty current is absent");

        let strict = RecordStore::new(Arc::new(MemoryStorage::new()), ConflictPolicy::Strict);
        strict
            .put("Aria", RecordBody::new(), None)
            .await
            .expect("new records are always allowed");
        let err = strict
            .put("Aria", RecordBody::new(), None)
            .await
            .expect_err("strict refuses");
        assert!(matches!(err, RecordStoreError::Conflict(_)));
        strict
            .put("Aria", RecordBody::new(), Some("Aria"))
            .await
            .expect("owner may still overwrite");
    }

    #[tokio::test]
    async fn empty_keys_are_rejected() {
        let store = store();
        let err = store
            .put("", RecordBody::new(), None)
            .await
            .expect_err("empty");
        assert!(matches!(err, RecordStoreError::EmptyKey));
        assert!(!store.exists("").await.expect("exists"));
    }

    #[tokio::test]
    async fn rename_moves_record_and_updates_name() {
        let store = store();
        store
            .put(
                "Aria Stormborn",
                body(json!({"name": "Aria Stormborn", "level": 5, "class": "Rogue"})),
                None,
            )
            .await
            .expect("seed");

        let key = store
            .rename(
                "Aria_Stormborn",
                "Aria_Stormwind",
                body(json!({"name": "Aria Stormwind", "level": 5, "class": "Rogue"})),
            )
            .await
            .expect("rename");

        assert_eq!(key.as_str(), "Aria_Stormwind");
        assert!(!store.exists("Aria_Stormborn").await.expect("exists"));
        let moved = store.get("Aria_Stormwind").await.expect("get");
        assert_eq!(moved.get("name"), Some(&json!("Aria Stormwind")));
        assert_eq!(moved.get("class"), Some(&json!("Rogue")));
    }

    #[tokio::test]
    async fn rename_merges_body_over_stored_record() {
        let store = store();
        store
            .put("Old", body(json!({"name": "Old", "notes": "keep me", "level": 2})), None)
            .await
            .expect("seed");

        store
            .rename("Old", "New", body(json!({"name": "", "level": 3})))
            .await
            .expect("rename");

        let moved = store.get("New").await.expect("get");
        assert_eq!(moved.get("name"), Some(&json!("Old")));
        assert_eq!(moved.get("notes"), Some(&json!("keep me")));
        assert_eq!(moved.get("level"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn rename_to_same_key_updates_in_place() {
        let store = store();
        store
            .put("Aria", body(json!({"level": 1})), None)
            .await
            .expect("seed");

        store
            .rename("Aria", "Aria", body(json!({"level": 2})))
            .await
            .expect("rename in place");

        assert_eq!(
            store.get("Aria").await.expect("get").get("level"),
            Some(&json!(2))
        );
    }

    #[tokio::test]
    async fn rename_conflict_leaves_store_unchanged() {
        let store = store();
        store
            .put("A", body(json!({"name": "A"})), None)
            .await
            .expect("seed a");
        store
            .put("B", body(json!({"name": "B"})), None)
            .await
            .expect("seed b");

        let err = store
            .rename("A", "B", body(json!({"name": "B"})))
            .await
            .expect_err("conflict");
        assert!(matches!(err, RecordStoreError::Conflict(key) if key.as_str() == "B"));

        assert_eq!(store.get("A").await.expect("a").get("name"), Some(&json!("A")));
        assert_eq!(store.get("B").await.expect("b").get("name"), Some(&json!("B")));
    }

    #[tokio::test]
    async fn rename_missing_source_is_not_found() {
        let err = store()
            .rename("ghost", "spirit", RecordBody::new())
            .await
            .expect_err("missing");
        assert!(matches!(err, RecordStoreError::NotFound(key) if key.as_str() == "ghost"));
    }

    #[tokio::test]
    async fn rename_rolls_back_when_old_record_cannot_be_removed() {
        let mut storage = MockRecordStorage::new();
        let old = StorageKey::from_name("Old");
        let new = StorageKey::from_name("New");

        storage
            .expect_read()
            .with(eq(old.clone()))
            .returning(|_| Ok(Some(RecordBody::new())));
        storage
            .expect_contains()
            .with(eq(new.clone()))
            .returning(|_| Ok(false));
        storage
            .expect_write()
            .with(eq(new.clone()), always())
            .times(1)
            .returning(|_, _| Ok(()));
        storage
            .expect_remove()
            .with(eq(old.clone()))
            .times(1)
            .returning(|_| Err(RepoError::database("remove", "permission denied")));
        storage
            .expect_remove()
            .with(eq(new.clone()))
            .times(1)
            .returning(|_| Ok(true));

        let store = RecordStore::new(Arc::new(storage), ConflictPolicy::Compatible);
        let err = store
            .rename("Old", "New", RecordBody::new())
            .await
            .expect_err("storage failure");

        assert!(matches!(err, RecordStoreError::Storage(_)));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = store();
        store
            .put("Doomed", RecordBody::new(), None)
            .await
            .expect("seed");

        store.delete("Doomed").await.expect("delete");

        assert!(!store.exists("Doomed").await.expect("exists"));
        let err = store.delete("Doomed").await.expect_err("already gone");
        assert!(matches!(err, RecordStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_ordered_with_fallbacks() {
        let store = store();
        store
            .put("Zed", body(json!({"name": "Zed", "class": "Wizard", "level": 7})), None)
            .await
            .expect("seed zed");
        store
            .put("Anon", RecordBody::new(), None)
            .await
            .expect("seed anon");

        let listing = store.list().await.expect("list");

        assert!(listing.skipped.is_empty());
        assert_eq!(listing.characters.len(), 2);
        assert_eq!(listing.characters[0].storage_key, "Anon");
        assert_eq!(listing.characters[0].name, "Anon");
        assert_eq!(listing.characters[0].class, "");
        assert_eq!(listing.characters[0].level, 1);
        assert_eq!(listing.characters[1].name, "Zed");
        assert_eq!(listing.characters[1].class, "Wizard");
        assert_eq!(listing.characters[1].level, 7);
    }

    #[tokio::test]
    async fn list_skips_unreadable_records() {
        let mut storage = MockRecordStorage::new();
        storage.expect_keys().returning(|| {
            Ok(vec![
                StorageKey::from_name("broken"),
                StorageKey::from_name("Aria"),
            ])
        });
        storage
            .expect_read()
            .with(eq(StorageKey::from_name("Aria")))
            .returning(|_| {
                let mut record = RecordBody::new();
                record.insert("name".into(), "Aria".into());
                Ok(Some(record))
            });
        storage
            .expect_read()
            .with(eq(StorageKey::from_name("broken")))
            .returning(|_| Err(RepoError::serialization("expected value at line 1")));

        let store = RecordStore::new(Arc::new(storage), ConflictPolicy::Compatible);
        let listing = store.list().await.expect("list");

        assert_eq!(listing.characters.len(), 1);
        assert_eq!(listing.characters[0].name, "Aria");
        assert_eq!(listing.skipped.len(), 1);
        assert_eq!(listing.skipped[0].storage_key, "broken");
    }

    #[tokio::test]
    async fn traversal_keys_stay_inside_storage() {
        let store = store();
        let key = store
            .put("../../etc/passwd", RecordBody::new(), None)
            .await
            .expect("put");
        assert_eq!(key.as_str(), "______etc_passwd");
    }
}
