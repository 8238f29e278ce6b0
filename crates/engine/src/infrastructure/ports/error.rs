//! Error types for port operations.

/// Storage backend errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Backend operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepoError {
    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Create a Serialization error.
    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    /// Check if this is a Serialization error.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}
