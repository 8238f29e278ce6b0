//! Service layer error types

use std::time::Duration;

use crate::ports::outbound::ApiError;

/// Errors returned by persistence gateway operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The record store call did not finish within the configured timeout
    #[error("Record store did not respond within {0:?}")]
    Timeout(Duration),
    /// The record store rejected or failed the call
    #[error("Record store error: {0}")]
    Api(#[from] ApiError),
    /// A record could not be converted to or from a character
    #[error("Invalid character record: {0}")]
    InvalidRecord(String),
}

impl GatewayError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Api(ApiError::NotFound))
    }

    /// Check if this is a name conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Api(ApiError::Conflict))
    }
}
