//! Charsheet Engine library.
//!
//! This crate contains the server side of the character sheet editor: the
//! record store and the HTTP API in front of it.
//!
//! ## Structure
//!
//! - `use_cases/` - Record store operations and conflict rules
//! - `infrastructure/` - Storage backends, configuration, port traits
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
