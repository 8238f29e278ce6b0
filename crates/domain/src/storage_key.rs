//! Storage keys derived from character display names.
//!
//! A storage key is the display name with every character outside
//! `[A-Za-z0-9_-]` replaced by `_`, truncated to [`MAX_STORAGE_KEY_LEN`].
//! Sanitization never fails. Distinct names can collide ("A!B" and "A@B"
//! both become "A_B"); the record store's conflict check is the only guard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a storage key, in characters.
pub const MAX_STORAGE_KEY_LEN: usize = 100;

/// Sanitize a display name into a storage key.
///
/// Characters outside the BMP count as two UTF-16 units and are replaced by
/// two underscores, so keys match those produced by browser clients.
pub fn sanitize(name: &str) -> String {
    let mut key = String::with_capacity(name.len().min(MAX_STORAGE_KEY_LEN));
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            key.push(c);
        } else {
            for _ in 0..c.len_utf16() {
                key.push('_');
            }
        }
        if key.len() >= MAX_STORAGE_KEY_LEN {
            break;
        }
    }
    // Every pushed char is ASCII, so byte truncation is char truncation.
    key.truncate(MAX_STORAGE_KEY_LEN);
    key
}

/// A sanitized storage key addressing one stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the storage key for a display name (or re-sanitize a key
    /// received from an untrusted caller).
    pub fn from_name(name: &str) -> Self {
        Self(sanitize(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
