//! Record storage port.

use async_trait::async_trait;
use charsheet_domain::StorageKey;
use charsheet_shared::RecordBody;

use super::RepoError;

// =============================================================================
// Record Storage
// =============================================================================

/// Raw keyed storage of record bodies.
///
/// Implementations only move bytes; conflict rules and locking live in
/// [`crate::use_cases::records::RecordStore`]. A key handed to a backend is
/// always sanitized.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// All stored keys, in no particular order.
    async fn keys(&self) -> Result<Vec<StorageKey>, RepoError>;

    async fn read(&self, key: &StorageKey) -> Result<Option<RecordBody>, RepoError>;

    /// Create or replace the record at `key`. Must not leave a partially
    /// written record behind on failure.
    async fn write(&self, key: &StorageKey, body: &RecordBody) -> Result<(), RepoError>;

    /// Remove the record at `key`. Returns false if nothing was stored there.
    async fn remove(&self, key: &StorageKey) -> Result<bool, RepoError>;

    async fn contains(&self, key: &StorageKey) -> Result<bool, RepoError>;
}
