//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with external systems without
//! depending on concrete implementations.

pub mod platform;
pub mod record_store_port;

pub use platform::{storage_keys, SessionStorage, TimeProvider};
pub use record_store_port::{ApiError, RecordStorePort};

#[cfg(test)]
pub use platform::{MockSessionStorage, MockTimeProvider};
#[cfg(test)]
pub use record_store_port::MockRecordStorePort;
