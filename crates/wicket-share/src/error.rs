//! Share-link error types.
//!
//! Only token *creation* errors; validation never errors, it returns a
//! [`ValidationOutcome`](crate::ValidationOutcome) so that a forged token
//! and a malformed one are indistinguishable to the caller.

use thiserror::Error;

/// Errors that can occur while minting share tokens.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The requested scope path is not a normalized relative path.
    #[error("invalid scope path '{path}': {reason}")]
    InvalidScopePath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Payload serialization failed.
    #[error("payload serialization failed: {0}")]
    SerializationError(String),
}

/// Result type for share-link operations.
pub type ShareResult<T> = Result<T, ShareError>;
