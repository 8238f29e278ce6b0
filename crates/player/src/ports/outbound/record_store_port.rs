//! Record Store Port - the client view of the engine's record store
//!
//! Keys passed to the port are storage keys; implementations re-sanitize
//! them before they reach the wire.

use charsheet_shared::{CharacterListResponse, RecordBody};

/// Errors from record store calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No record at the requested key
    #[error("Character not found")]
    NotFound,
    /// The write would replace a record owned by another name
    #[error("A character with this name already exists")]
    Conflict,
    /// The server rejected or failed the request
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Request failed to send or the connection dropped
    #[error("Request failed: {0}")]
    Request(String),
    /// No response within the request timeout
    #[error("Request timed out")]
    Timeout,
    /// Failed to parse response data
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordStorePort: Send + Sync {
    async fn list(&self) -> Result<CharacterListResponse, ApiError>;

    async fn get(&self, key: &str) -> Result<RecordBody, ApiError>;

    /// Save `body` at `key`, returning the storage key written.
    async fn put(
        &self,
        key: &str,
        body: RecordBody,
        current: Option<String>,
    ) -> Result<String, ApiError>;

    /// Move the record at `old_key` to `new_key`, returning the new key.
    async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        body: RecordBody,
    ) -> Result<String, ApiError>;

    async fn exists(&self, key: &str) -> Result<bool, ApiError>;

    async fn delete(&self, key: &str) -> Result<(), ApiError>;
}
