//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod config;
pub mod file_storage;
pub mod memory_storage;
pub mod ports;
