//! Application services
//!
//! Services depend on port traits, not concrete infrastructure
//! implementations.

pub mod debounce;
pub mod persistence_gateway;

pub use debounce::Debouncer;
pub use persistence_gateway::{
    GatewayConfig, PersistenceGateway, SaveOutcome, DEFAULT_DEBOUNCE, DEFAULT_REQUEST_TIMEOUT,
};
