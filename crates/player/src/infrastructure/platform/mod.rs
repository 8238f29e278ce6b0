//! Platform-specific implementations
//!
//! This module provides implementations of the platform abstraction traits
//! defined in `ports/outbound/platform.rs`.

mod desktop;

pub use desktop::{DesktopSessionStorage, MemorySessionStorage, SystemTimeProvider};
