//! Persistence Gateway - keeps the open character in sync with the record store
//!
//! Every mutation recomputes derived fields and re-arms a debounced save. When
//! the save fires, the character is written under the storage key derived from
//! its display name: a changed name on an already-saved record becomes a
//! rename, anything else a plain save. Name conflicts never destroy local
//! edits or the colliding record; they are surfaced through `name_error` and
//! nothing is retried until the next mutation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use charsheet_domain::{recompute, AttackId, Character, SpellId, StorageKey};
use charsheet_shared::{CharacterSummary, RecordBody, NAME_CONFLICT_MESSAGE};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::debounce::Debouncer;
use crate::application::error::GatewayError;
use crate::ports::outbound::{
    storage_keys, ApiError, RecordStorePort, SessionStorage, TimeProvider,
};
use crate::state::EditorSession;

/// Quiet period after the last mutation before an automatic save.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Upper bound on any single record store call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    pub debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// What a save attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The display name is blank; nothing was written.
    Skipped,
    Saved(StorageKey),
    Renamed { from: StorageKey, to: StorageKey },
    /// Another record owns the name; `name_error` is set.
    Conflict,
}

struct Inner {
    store: Arc<dyn RecordStorePort>,
    session_storage: Arc<dyn SessionStorage>,
    time: Arc<dyn TimeProvider>,
    config: GatewayConfig,
    session: Mutex<EditorSession>,
    /// Serializes saves, renames and deletes.
    save_lock: Mutex<()>,
    debouncer: Debouncer,
}

/// Owns one editing session and persists it through a [`RecordStorePort`].
#[derive(Clone)]
pub struct PersistenceGateway {
    inner: Arc<Inner>,
}

impl PersistenceGateway {
    pub fn new(
        store: Arc<dyn RecordStorePort>,
        session_storage: Arc<dyn SessionStorage>,
        time: Arc<dyn TimeProvider>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                session_storage,
                time,
                config,
                session: Mutex::new(EditorSession::new()),
                save_lock: Mutex::new(()),
                debouncer: Debouncer::new(config.debounce),
            }),
        }
    }

    pub fn config(&self) -> GatewayConfig {
        self.inner.config
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Start the session: restore the remembered record, refresh the listing
    /// and load the remembered record if there is one.
    pub async fn open(&self) -> Result<(), GatewayError> {
        let remembered = self
            .inner
            .session_storage
            .load(storage_keys::CURRENT_CHARACTER)
            .filter(|key| !key.is_empty())
            .map(|key| StorageKey::from_name(&key));

        // Listing failures are logged; the editor still opens.
        let _ = self.list_characters().await;

        let Some(key) = remembered else {
            return Ok(());
        };

        // The remembered key is adopted only after its record loads.
        tracing::info!(storage_key = %key, "Restoring last edited character");
        if let Err(e) = self.load_character(key.as_str()).await {
            if e.is_not_found() {
                self.inner
                    .session_storage
                    .remove(storage_keys::CURRENT_CHARACTER);
            }
            return Err(e);
        }
        Ok(())
    }

    /// End the session. A save still waiting for its quiet period runs now,
    /// and an in-flight save is waited for.
    pub async fn close(&self) {
        self.flush().await;
        tracing::debug!("Editor session closed");
    }

    /// Run a waiting save immediately, or wait for one in flight.
    pub async fn flush(&self) {
        if self.inner.debouncer.settle().await {
            self.autosave().await;
        }
        let _saving = self.inner.save_lock.lock().await;
    }

    // =========================================================================
    // Observed state
    // =========================================================================

    pub async fn snapshot(&self) -> EditorSession {
        self.inner.session.lock().await.clone()
    }

    pub async fn character(&self) -> Character {
        self.inner.session.lock().await.character.clone()
    }

    pub async fn current_key(&self) -> Option<StorageKey> {
        self.inner.session.lock().await.current_key.clone()
    }

    pub async fn name_error(&self) -> Option<String> {
        self.inner.session.lock().await.name_error.clone()
    }

    pub async fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.inner.session.lock().await.last_saved
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.session.lock().await.is_loading
    }

    /// The cached listing from the last successful refresh.
    pub async fn characters(&self) -> Vec<CharacterSummary> {
        self.inner.session.lock().await.characters.clone()
    }

    pub fn has_pending_save(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply an edit to the open character.
    ///
    /// Derived fields are recomputed and the automatic save re-armed, unless
    /// the character was never saved and still has a blank name.
    pub async fn update<F, R>(&self, mutate: F) -> R
    where
        F: FnOnce(&mut Character) -> R + Send,
        R: Send,
    {
        let (result, arm) = {
            let mut session = self.inner.session.lock().await;
            let result = mutate(&mut session.character);
            recompute(&mut session.character);
            (result, session.wants_autosave())
        };
        self.rearm(arm);
        result
    }

    /// Like [`update`](Self::update), but a `false` from `mutate` means
    /// nothing changed and the save timer is left alone.
    async fn update_if<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Character) -> bool + Send,
    {
        let arm = {
            let mut session = self.inner.session.lock().await;
            if !mutate(&mut session.character) {
                return false;
            }
            recompute(&mut session.character);
            session.wants_autosave()
        };
        self.rearm(arm);
        true
    }

    pub async fn add_attack(&self) -> AttackId {
        self.update(|character| character.add_attack()).await
    }

    pub async fn remove_attack(&self, id: AttackId) -> bool {
        self.update_if(|character| character.remove_attack(id)).await
    }

    pub async fn add_spell(&self, level: u8) -> SpellId {
        self.update(|character| character.add_spell(level)).await
    }

    pub async fn remove_spell(&self, id: SpellId) -> bool {
        self.update_if(|character| character.remove_spell(id)).await
    }

    fn rearm(&self, arm: bool) {
        if arm {
            let gateway = self.clone();
            self.inner
                .debouncer
                .schedule(async move { gateway.autosave().await });
        } else {
            self.inner.debouncer.cancel();
        }
    }

    // =========================================================================
    // Saving
    // =========================================================================

    async fn autosave(&self) {
        match self.save_now().await {
            Ok(outcome) => tracing::debug!(?outcome, "Auto-save finished"),
            Err(e) => tracing::warn!(error = %e, "Auto-save failed"),
        }
    }

    /// Persist the open character now, bypassing the debounce timer.
    pub async fn save_now(&self) -> Result<SaveOutcome, GatewayError> {
        let _saving = self.inner.save_lock.lock().await;

        let (body, candidate, current) = {
            let mut session = self.inner.session.lock().await;
            if !session.character.has_display_name() {
                return Ok(SaveOutcome::Skipped);
            }
            session.name_error = None;
            (
                to_record(&session.character)?,
                StorageKey::from_name(&session.character.name),
                session.current_key.clone(),
            )
        };

        match current {
            Some(current) if current != candidate => {
                self.rename_record(current, candidate, body).await
            }
            current => self.put_record(candidate, body, current).await,
        }
    }

    async fn rename_record(
        &self,
        from: StorageKey,
        to: StorageKey,
        body: RecordBody,
    ) -> Result<SaveOutcome, GatewayError> {
        let result = self
            .call(self.inner.store.rename(from.as_str(), to.as_str(), body))
            .await;

        match result {
            Ok(saved) => {
                let to = StorageKey::from_name(&saved);
                self.record_saved(&to).await;
                tracing::info!(from = %from, to = %to, "Renamed character");
                let _ = self.list_characters().await;
                Ok(SaveOutcome::Renamed { from, to })
            }
            Err(e) if e.is_conflict() => {
                self.record_conflict(&to).await;
                Ok(SaveOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    async fn put_record(
        &self,
        key: StorageKey,
        body: RecordBody,
        current: Option<StorageKey>,
    ) -> Result<SaveOutcome, GatewayError> {
        let result = self
            .call(self.inner.store.put(
                key.as_str(),
                body,
                current.map(StorageKey::into_string),
            ))
            .await;

        match result {
            Ok(saved) => {
                let key = StorageKey::from_name(&saved);
                let listed = self.record_saved(&key).await;
                tracing::debug!(storage_key = %key, "Saved character");
                if !listed {
                    let _ = self.list_characters().await;
                }
                Ok(SaveOutcome::Saved(key))
            }
            Err(e) if e.is_conflict() => {
                self.record_conflict(&key).await;
                Ok(SaveOutcome::Conflict)
            }
            Err(e) => Err(e),
        }
    }

    /// Adopt `key` as the current record. Returns whether it was already
    /// in the cached listing.
    async fn record_saved(&self, key: &StorageKey) -> bool {
        let now = self.inner.time.now();
        let mut session = self.inner.session.lock().await;
        self.set_current_key(&mut session, Some(key.clone()));
        session.name_error = None;
        session.last_saved = Some(now);
        session.is_listed(key)
    }

    async fn record_conflict(&self, key: &StorageKey) {
        tracing::info!(storage_key = %key, "Name already taken by another character");
        self.inner.session.lock().await.name_error = Some(NAME_CONFLICT_MESSAGE.to_string());
    }

    fn set_current_key(&self, session: &mut EditorSession, key: Option<StorageKey>) {
        if session.current_key == key {
            return;
        }
        match &key {
            Some(key) => self
                .inner
                .session_storage
                .save(storage_keys::CURRENT_CHARACTER, key.as_str()),
            None => self
                .inner
                .session_storage
                .remove(storage_keys::CURRENT_CHARACTER),
        }
        session.current_key = key;
    }

    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, GatewayError> {
        let limit = self.inner.config.request_timeout;
        match tokio::time::timeout(limit, request).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(_) => {
                tracing::warn!(timeout = ?limit, "Record store call timed out");
                Err(GatewayError::Timeout(limit))
            }
        }
    }

    // =========================================================================
    // Record management
    // =========================================================================

    /// Refresh the cached listing.
    ///
    /// On failure the previous listing is kept.
    pub async fn list_characters(&self) -> Result<Vec<CharacterSummary>, GatewayError> {
        match self.call(self.inner.store.list()).await {
            Ok(listing) => {
                for skipped in &listing.skipped {
                    tracing::warn!(
                        storage_key = %skipped.storage_key,
                        reason = %skipped.reason,
                        "Record store skipped an unreadable character"
                    );
                }
                self.inner.session.lock().await.characters = listing.characters.clone();
                Ok(listing.characters)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list characters");
                Err(e)
            }
        }
    }

    /// Open the record at `key` in the editor.
    ///
    /// Pending edits to the previous character are saved first. Fields
    /// missing from the record, or stored with the wrong shape, take their
    /// defaults.
    pub async fn load_character(&self, key: &str) -> Result<(), GatewayError> {
        let key = StorageKey::from_name(key);
        self.flush().await;

        {
            let mut session = self.inner.session.lock().await;
            session.is_loading = true;
            session.name_error = None;
        }

        let result = self.call(self.inner.store.get(key.as_str())).await;

        let mut session = self.inner.session.lock().await;
        session.is_loading = false;

        let character = match result.map(from_record) {
            Ok(character) => character,
            Err(e) => {
                tracing::warn!(storage_key = %key, error = %e, "Failed to load character");
                if e.is_not_found() && session.current_key.as_ref() == Some(&key) {
                    self.set_current_key(&mut session, None);
                }
                return Err(e);
            }
        };

        session.character = character;
        self.set_current_key(&mut session, Some(key.clone()));
        tracing::info!(storage_key = %key, "Loaded character");
        Ok(())
    }

    /// Delete the record at `key`. Deleting the open record starts a new
    /// character. Returns whether the record was deleted.
    pub async fn delete_character(&self, key: &str) -> bool {
        let key = StorageKey::from_name(key);
        let is_current = self.current_key().await.as_ref() == Some(&key);
        let cancelled = is_current && self.inner.debouncer.cancel();

        let result = {
            let _saving = self.inner.save_lock.lock().await;
            self.call(self.inner.store.delete(key.as_str())).await
        };

        if let Err(e) = result {
            tracing::warn!(storage_key = %key, error = %e, "Failed to delete character");
            if cancelled {
                self.rearm(true);
            }
            return false;
        }

        tracing::info!(storage_key = %key, "Deleted character");
        let _ = self.list_characters().await;
        if self.current_key().await.as_ref() == Some(&key) {
            self.new_character().await;
        }
        true
    }

    /// Replace the open character with a fresh one. Nothing is deleted from
    /// the store; a save still waiting for its quiet period is dropped and a
    /// save already in flight finishes first.
    pub async fn new_character(&self) {
        self.inner.debouncer.settle().await;
        let _saving = self.inner.save_lock.lock().await;
        let mut session = self.inner.session.lock().await;
        self.set_current_key(&mut session, None);
        session.reset();
    }
}

fn to_record(character: &Character) -> Result<RecordBody, GatewayError> {
    match serde_json::to_value(character) {
        Ok(serde_json::Value::Object(body)) => Ok(body),
        Ok(_) => Err(GatewayError::InvalidRecord(
            "character did not serialize to an object".to_string(),
        )),
        Err(e) => Err(GatewayError::InvalidRecord(e.to_string())),
    }
}

fn from_record(body: RecordBody) -> Character {
    let mut character = Character::from_record(body);
    recompute(&mut character);
    character
}
