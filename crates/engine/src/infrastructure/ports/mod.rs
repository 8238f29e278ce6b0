//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Record storage (JSON files on disk, or memory for tests and demos)

mod error;
mod storage;

pub use error::RepoError;
pub use storage::RecordStorage;

#[cfg(test)]
pub use storage::MockRecordStorage;
