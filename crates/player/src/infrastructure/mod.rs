//! Infrastructure layer - adapters for the outbound ports.

pub mod http;
pub mod platform;
