//! Authentication error types.
//!
//! These cover gateway *construction* only. Per-request outcomes are
//! never errors; they are [`AuthDecision`](crate::AuthDecision) values,
//! because every failure mode must yield a response, never a fault.

use thiserror::Error;

/// Errors raised while assembling the gateway from configuration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A configuration value made a component unbuildable.
    #[error("gateway configuration rejected: {0}")]
    Config(String),

    /// The filesystem root or hide patterns were rejected.
    #[error(transparent)]
    Vfs(#[from] wicket_vfs::VfsError),

    /// The share secret was rejected.
    #[error(transparent)]
    Crypto(#[from] wicket_crypto::CryptoError),
}

/// Result type for gateway construction.
pub type AuthResult<T> = Result<T, AuthError>;
