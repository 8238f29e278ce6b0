//! Response types for the record store HTTP API
//!
//! Every body is camelCase JSON. Failures carry an [`ErrorResponse`]; the
//! `exists` flag is only present on name conflicts.

use serde::{Deserialize, Serialize};

use crate::{RecordBody, NAME_CONFLICT_MESSAGE};

// =============================================================================
// Listing
// =============================================================================

/// One entry of a character listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    /// Display name, or the storage key when the record has none.
    pub name: String,
    /// Class, or empty when the record has none.
    #[serde(default)]
    pub class: String,
    /// Level, or 1 when the record has none.
    #[serde(default = "default_level")]
    pub level: i64,
    pub storage_key: String,
}

fn default_level() -> i64 {
    1
}

impl CharacterSummary {
    /// Summarize a stored record, falling back to the storage key for the
    /// name, `""` for the class and `1` for the level.
    pub fn from_record(storage_key: &str, body: &RecordBody) -> Self {
        let name = body
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(storage_key)
            .to_string();
        let class = body
            .get("class")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let level = body
            .get("level")
            .and_then(|v| v.as_i64())
            .filter(|level| *level != 0)
            .unwrap_or(1);

        Self {
            name,
            class,
            level,
            storage_key: storage_key.to_string(),
        }
    }
}

/// A record that could not be read while listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    pub storage_key: String,
    pub reason: String,
}

/// Body of `GET /api/characters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterListResponse {
    pub characters: Vec<CharacterSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

// =============================================================================
// Mutations
// =============================================================================

/// Body of a successful save or rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub storage_key: String,
}

impl SaveResponse {
    pub fn saved(storage_key: impl Into<String>) -> Self {
        Self {
            success: true,
            storage_key: storage_key.into(),
        }
    }
}

/// Body of `GET /api/characters/{key}/exists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistsResponse {
    pub exists: bool,
    pub storage_key: String,
}

/// Body of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            exists: None,
        }
    }

    /// The 409 body for a write that would clobber another record.
    pub fn name_conflict() -> Self {
        Self {
            error: NAME_CONFLICT_MESSAGE.to_string(),
            exists: Some(true),
        }
    }
}
