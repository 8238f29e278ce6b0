//! Route paths of the record store API.
//!
//! The engine mounts these patterns; the player builds concrete paths with
//! the helpers below. Keys are expected to be sanitized already, so they
//! need no percent-encoding.

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api";

pub const HEALTH: &str = "/health";
pub const CHARACTERS: &str = "/characters";
pub const CHARACTER: &str = "/characters/{key}";
pub const CHARACTER_EXISTS: &str = "/characters/{key}/exists";
pub const CHARACTER_RENAME: &str = "/characters/{old_key}/rename/{new_key}";

pub fn character_path(key: &str) -> String {
    format!("{CHARACTERS}/{key}")
}

pub fn exists_path(key: &str) -> String {
    format!("{CHARACTERS}/{key}/exists")
}

pub fn rename_path(old_key: &str, new_key: &str) -> String {
    format!("{CHARACTERS}/{old_key}/rename/{new_key}")
}
