//! Charsheet Protocol - Shared types for the record store API
//!
//! This crate contains the types exchanged between the Engine (record store
//! server) and the Player (persistence gateway client):
//! - Request query parameters
//! - Response bodies, including the error body
//! - Route paths, so both sides build identical URLs
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and the domain crate
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Wire compatibility** - camelCase JSON, matching existing clients

pub mod requests;
pub mod responses;
pub mod routes;

pub use requests::SaveQuery;
pub use responses::{
    CharacterListResponse, CharacterSummary, DeleteResponse, ErrorResponse, ExistsResponse,
    SaveResponse, SkippedRecord,
};

/// A stored record: a flat keyed mapping of character fields.
///
/// The record store treats bodies opaquely apart from `name`, `class`, and
/// `level`, which it reads for listings and renames.
pub type RecordBody = serde_json::Map<String, serde_json::Value>;

/// Message shown when a write would overwrite a record owned by another name.
pub const NAME_CONFLICT_MESSAGE: &str = "A character with this name already exists";
