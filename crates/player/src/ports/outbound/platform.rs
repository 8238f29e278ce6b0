//! Platform abstraction ports
//!
//! These traits abstract platform-specific operations so that application
//! code stays platform-agnostic and testable with mock implementations.

use chrono::{DateTime, Utc};

/// Time operations abstraction
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Small persistent key-value storage that survives restarts
/// (a settings file on desktop).
///
/// Failures are logged by the implementation, never surfaced.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str);
}

/// Storage key constants
///
/// These are kept in the ports layer as they define the contract for
/// what keys are used across the application.
pub mod storage_keys {
    /// Storage key of the record open in the editor.
    pub const CURRENT_CHARACTER: &str = "charsheet_current_character";
}
