//! Authorization header parsing.
//!
//! Parsing is strict on purpose: exactly one header, bounded size, one
//! scheme, decodable base64. Anything else is a parse error the caller
//! treats as an authentication failure - never a server error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use wicket_core::GatewayRequest;

/// Upper bound on an `Authorization` header we are willing to parse.
const MAX_AUTHORIZATION_LEN: usize = 1024;

/// Why a basic-credentials header failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialParseError {
    /// No `Authorization` header present.
    #[error("authorization header missing")]
    Missing,

    /// Header present but empty.
    #[error("authorization header empty")]
    Empty,

    /// More than one `Authorization` header.
    #[error("multiple authorization headers")]
    Multiple,

    /// Header exceeds the size bound.
    #[error("authorization header oversized")]
    Oversized,

    /// Scheme is not `Basic`.
    #[error("authorization scheme is not basic")]
    Scheme,

    /// Credentials are not decodable base64 `user:pass`.
    #[error("authorization credentials undecodable")]
    Encoding,
}

/// Parse exactly one `Authorization: Basic ..` header into
/// `(username, password)`.
///
/// The decoded value is split on the *first* colon only, preserving
/// colons inside the password.
///
/// # Errors
///
/// Returns the specific [`CredentialParseError`] for a missing, empty,
/// repeated, oversized, wrong-scheme, or undecodable header.
pub fn parse_basic_authorization(
    req: &GatewayRequest,
) -> Result<(String, String), CredentialParseError> {
    match req.header_count("Authorization") {
        0 => return Err(CredentialParseError::Missing),
        1 => {}
        _ => return Err(CredentialParseError::Multiple),
    }

    let value = req
        .header("Authorization")
        .ok_or(CredentialParseError::Missing)?;
    if value.is_empty() {
        return Err(CredentialParseError::Empty);
    }
    if value.len() > MAX_AUTHORIZATION_LEN {
        return Err(CredentialParseError::Oversized);
    }

    let (scheme, encoded) = value
        .split_once(' ')
        .ok_or(CredentialParseError::Scheme)?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return Err(CredentialParseError::Scheme);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| CredentialParseError::Encoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialParseError::Encoding)?;

    let (user, pass) = decoded
        .split_once(':')
        .ok_or(CredentialParseError::Encoding)?;
    Ok((user.to_string(), pass.to_string()))
}

/// Extract the token from a bearer header value.
///
/// Accepts either a raw token or a `Bearer <token>` prefixed value.
#[must_use]
pub fn extract_bearer(value: &str) -> &str {
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("Bearer") => rest.trim_start(),
        _ => value,
    }
}
