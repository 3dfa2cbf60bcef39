//! Signature-verification error types.
//!
//! Each variant maps to a wire-protocol error code the machine-client
//! surface returns in its structured error body. A missing authorization
//! header is deliberately distinguishable from a present-but-wrong
//! signature; nothing else about a failure is.

use thiserror::Error;

/// Errors produced while verifying a signed API request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigV4Error {
    /// No authorization header was sent at all.
    #[error("request is missing a required security header")]
    MissingSecurityHeader,

    /// The computed signature does not match the presented one.
    #[error("the request signature we calculated does not match the signature you provided")]
    SignatureDoesNotMatch,

    /// The presented access key is not one we know.
    #[error("the access key id you provided does not exist in our records")]
    InvalidAccessKeyId,

    /// The declared request time is outside the allowed skew window.
    #[error("the difference between the request time and the current time is too large")]
    RequestTimeTooSkewed,

    /// The authorization header is present but does not parse.
    #[error("malformed authorization header: {0}")]
    MalformedAuthorization(String),

    /// The request timestamp header is absent or does not parse.
    #[error("invalid request timestamp: {0}")]
    InvalidTimestamp(String),

    /// Signature verification is not configured on this deployment.
    #[error("signature verification is not enabled")]
    VerifierDisabled,
}

impl SigV4Error {
    /// The wire-protocol error code for the structured error body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSecurityHeader => "MissingSecurityHeader",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::InvalidAccessKeyId => "InvalidAccessKeyId",
            Self::RequestTimeTooSkewed => "RequestTimeTooSkewed",
            Self::MalformedAuthorization(_) => "AuthorizationHeaderMalformed",
            Self::InvalidTimestamp(_) => "AccessDenied",
            Self::VerifierDisabled => "AccessDenied",
        }
    }
}

/// Result type for signature verification.
pub type SigV4Result<T> = Result<T, SigV4Error>;
