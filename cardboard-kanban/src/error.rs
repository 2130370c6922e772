//! Error types for the board engine

use cardboard_common::ContainerId;
use cardboard_remote::RemoteError;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur in the reorder engine.
///
/// Structural problems (bad indices) never reach this type; they are clamped
/// before any state is touched. Remote failures during a commit do not
/// surface here either - they are reported per call in the commit report so
/// the rest of the gesture can still land.
#[derive(Debug, Error)]
pub enum EngineError {
    /// List not cached by the engine
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// Card not cached by the engine
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// The named container is not known to the store
    #[error("unknown container: {container}")]
    UnknownContainer { container: ContainerId },

    /// The container cannot hold the dragged item kind
    #[error("container {container} cannot receive the dragged item")]
    InvalidTarget { container: ContainerId },

    /// A drag gesture is already in progress
    #[error("a drag session is already active")]
    DragInProgress,

    /// No drag gesture is in progress
    #[error("no drag session is active")]
    NoActiveDrag,

    /// A remote call failed outside of a commit (load, create, refresh)
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl EngineError {
    /// Create a list-not-found error
    pub fn list_not_found(id: impl Into<String>) -> Self {
        Self::ListNotFound { id: id.into() }
    }

    /// Create a card-not-found error
    pub fn card_not_found(id: impl Into<String>) -> Self {
        Self::CardNotFound { id: id.into() }
    }

    /// Check if retrying the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(remote) if remote.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::card_not_found("abc123");
        assert_eq!(err.to_string(), "card not found: abc123");
    }

    #[test]
    fn test_retryable() {
        let err = EngineError::from(RemoteError::network("timeout"));
        assert!(err.is_retryable());
        assert!(!EngineError::NoActiveDrag.is_retryable());
    }
}
