//! Engine configuration from environment variables.
//!
//! Supported environment variables:
//! - CHARACTERS_DIR: directory holding one JSON file per record (default `characters`)
//! - STORAGE_BACKEND: `file` or `memory` (default `file`)
//! - RECORD_CONFLICT_POLICY: `compatible` or `strict` (default `compatible`)
//! - SERVER_HOST: bind address (default `0.0.0.0`)
//! - SERVER_PORT or PORT: bind port (default 3001)
//!
//! Invalid values are logged and replaced by the default.

use std::path::PathBuf;

use crate::use_cases::ConflictPolicy;

pub const DEFAULT_CHARACTERS_DIR: &str = "characters";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Some(Self::File),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub characters_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub conflict_policy: ConflictPolicy,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            characters_dir: PathBuf::from(DEFAULT_CHARACTERS_DIR),
            storage_backend: StorageBackend::default(),
            conflict_policy: ConflictPolicy::default(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("CHARACTERS_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.characters_dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup("STORAGE_BACKEND") {
            match StorageBackend::parse(&val) {
                Some(backend) => config.storage_backend = backend,
                None => tracing::warn!(val = %val, "STORAGE_BACKEND is not file or memory, ignoring"),
            }
        }

        if let Some(val) = lookup("RECORD_CONFLICT_POLICY") {
            match ConflictPolicy::parse(&val) {
                Some(policy) => config.conflict_policy = policy,
                None => tracing::warn!(
                    val = %val,
                    "RECORD_CONFLICT_POLICY is not compatible or strict, ignoring"
                ),
            }
        }

        if let Some(host) = lookup("SERVER_HOST").filter(|host| !host.trim().is_empty()) {
            config.server_host = host;
        }

        if let Some(val) = lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            match val.trim().parse::<u16>() {
                Ok(port) => config.server_port = port,
                Err(_) => tracing::warn!(val = %val, "SERVER_PORT is not a valid port, ignoring"),
            }
        }

        config
    }
}
