//! Error types for remote gateway calls

use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, RemoteError>;

/// Errors a remote call can fail with.
///
/// Each call is independently fallible; the engine decides per variant
/// whether to roll back, refetch, or retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The container or item no longer exists (e.g. concurrently deleted)
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The caller is not allowed to perform the operation
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The request was structurally invalid after a concurrent change
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Transient transport failure; safe to retry
    #[error("network error: {message}")]
    Network { message: String },

    /// Authoritative state cannot be merged with the request
    #[error("conflict: {message}")]
    Conflict { message: String },
}

impl RemoteError {
    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check if the failed call's target vanished and the cache must refetch
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RemoteError::not_found("card", "abc123");
        assert_eq!(err.to_string(), "card not found: abc123");
    }

    #[test]
    fn test_retryable() {
        assert!(RemoteError::network("timeout").is_retryable());
        assert!(!RemoteError::conflict("stale").is_retryable());
        assert!(!RemoteError::not_found("list", "x").is_retryable());
    }

    #[test]
    fn test_gone() {
        assert!(RemoteError::not_found("card", "x").is_gone());
        assert!(!RemoteError::network("down").is_gone());
    }
}
