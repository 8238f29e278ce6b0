//! Charsheet Player - the editor side of the character sheet.
//!
//! Holds the open character, keeps its derived fields current and persists
//! it to the engine's record store through the [`PersistenceGateway`].
//!
//! [`PersistenceGateway`]: application::services::PersistenceGateway

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod state;
