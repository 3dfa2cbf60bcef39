//! VFS error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing the resolver or policy matcher.
///
/// Per-request checks never error; they deny by returning `None` or
/// `false` so a malformed request can not be told apart from a forbidden
/// one by error shape.
#[derive(Debug, Error)]
pub enum VfsError {
    /// The configured root could not be canonicalized.
    #[error("root directory unavailable: {root}: {message}")]
    RootUnavailable {
        /// The configured root path.
        root: PathBuf,
        /// Underlying I/O failure.
        message: String,
    },

    /// A hide pattern failed to compile.
    #[error("invalid hide pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },
}

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;
