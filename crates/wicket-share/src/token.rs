//! Share-link token minting, validation, and scope enforcement.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wicket_core::Timestamp;
use wicket_crypto::{MacSecret, base64url_decode, base64url_encode, random_hex};
use wicket_vfs::normalize_request_path;

use crate::error::{ShareError, ShareResult};

/// Default clock-skew tolerance in seconds.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 30;

/// Length of a one-time nonce in random bytes (hex doubles it).
const NONCE_LEN: usize = 16;

/// What a share token grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMode {
    /// Exactly one file.
    File,
    /// A directory and everything beneath it.
    Directory,
}

impl std::fmt::Display for ShareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// The signed wire payload.
///
/// Field order is fixed; the signature covers the exact serialized bytes
/// and validation re-derives the tag over the *received* bytes, so the
/// payload is immutable once signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SharePayload {
    mode: ShareMode,
    scope_path: String,
    expires_at: i64,
    #[serde(default)]
    one_time: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nonce: Option<String>,
}

/// The validated, in-memory form of a share token.
///
/// Reconstructed per request from a validated token, or from a session
/// lookup after one-time redemption - in the latter case `token` is
/// blanked so the raw secret is not retained beyond first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAccessContext {
    /// What kind of scope the token grants.
    pub mode: ShareMode,
    /// Normalized relative path the grant is anchored at.
    pub scope_path: String,
    /// Expiry instant captured at mint time.
    pub expires_at: Timestamp,
    /// The raw token this context was built from (empty after redemption).
    pub token: String,
    /// Whether the token is single-use.
    pub one_time: bool,
    /// Nonce for one-time consumption (present iff `one_time`).
    pub nonce: Option<String>,
}

impl ShareAccessContext {
    /// This context with the raw token removed.
    #[must_use]
    pub fn with_blanked_token(mut self) -> Self {
        self.token = String::new();
        self
    }

    /// Whether this grant covers a request path.
    ///
    /// File mode requires the exact path; directory mode requires lexical
    /// containment on a path-segment boundary. Evaluated on every request
    /// carrying the token, not just at creation.
    #[must_use]
    pub fn allows(&self, request_path: &str) -> bool {
        let Some(rel) = normalize_request_path(request_path) else {
            return false;
        };
        match self.mode {
            ShareMode::File => rel == self.scope_path,
            ShareMode::Directory => {
                if self.scope_path.is_empty() {
                    return true;
                }
                rel == self.scope_path
                    || rel
                        .strip_prefix(self.scope_path.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Outcome of validating a share token.
///
/// `Expired` lets callers say "link expired" instead of "access denied"
/// without re-exposing the signature-validity boundary: only a token
/// whose signature checked out can ever report as expired.
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// Signature and expiry check out.
    Valid(ShareAccessContext),
    /// Signature checks out but the token is past expiry plus tolerance.
    Expired,
    /// Tampered, truncated, or never a token. Indistinguishable by design.
    Invalid,
}

impl ValidationOutcome {
    /// The context, if valid.
    #[must_use]
    pub fn context(&self) -> Option<&ShareAccessContext> {
        match self {
            Self::Valid(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Consume into the context, if valid.
    #[must_use]
    pub fn into_context(self) -> Option<ShareAccessContext> {
        match self {
            Self::Valid(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Whether the token expired (as opposed to never being valid).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }
}

/// Mints and validates share-link tokens with a server-held secret.
#[derive(Debug, Clone)]
pub struct ShareTokenService {
    secret: MacSecret,
    clock_skew_secs: i64,
}

impl ShareTokenService {
    /// Create a service with the default clock-skew tolerance.
    #[must_use]
    pub fn new(secret: MacSecret) -> Self {
        Self {
            secret,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }

    /// Override the clock-skew tolerance.
    #[must_use]
    pub fn with_clock_skew(mut self, secs: i64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    /// The configured clock-skew tolerance in seconds.
    #[must_use]
    pub fn clock_skew_secs(&self) -> i64 {
        self.clock_skew_secs
    }

    /// Mint a token.
    ///
    /// One-time tokens get a fresh random nonce embedded in the signed
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::InvalidScopePath`] if `scope_path` is not a
    /// normalized relative path, or [`ShareError::SerializationError`] if
    /// payload encoding fails.
    pub fn create(
        &self,
        mode: ShareMode,
        scope_path: &str,
        expires_at: Timestamp,
        one_time: bool,
    ) -> ShareResult<String> {
        let scope = Self::checked_scope(mode, scope_path)?;
        let payload = SharePayload {
            mode,
            scope_path: scope,
            expires_at: expires_at.unix_seconds(),
            one_time,
            nonce: one_time.then(|| random_hex(NONCE_LEN)),
        };
        let bytes = serde_json::to_vec(&payload)
            .map_err(|e| ShareError::SerializationError(e.to_string()))?;
        let tag = self.secret.tag(&bytes);
        Ok(format!(
            "{}.{}",
            base64url_encode(&bytes),
            tag.to_base64url()
        ))
    }

    /// Validate a token against `now`.
    ///
    /// Any mismatch - truncation, corruption, a forged tag - yields
    /// [`ValidationOutcome::Invalid`]. A token within the skew window of
    /// its expiry is still valid; beyond it, [`ValidationOutcome::Expired`].
    #[must_use]
    pub fn validate(&self, token: &str, now: Timestamp) -> ValidationOutcome {
        let Some((payload_b64, tag_b64)) = token.split_once('.') else {
            return ValidationOutcome::Invalid;
        };
        let Ok(payload_bytes) = base64url_decode(payload_b64) else {
            return ValidationOutcome::Invalid;
        };
        let Ok(tag) = base64url_decode(tag_b64) else {
            return ValidationOutcome::Invalid;
        };
        if !self.secret.verify(&payload_bytes, &tag) {
            debug!("share token failed signature check");
            return ValidationOutcome::Invalid;
        }
        let Ok(payload) = serde_json::from_slice::<SharePayload>(&payload_bytes) else {
            return ValidationOutcome::Invalid;
        };
        let Some(expires_at) = Timestamp::from_unix_seconds(payload.expires_at) else {
            return ValidationOutcome::Invalid;
        };
        if payload.one_time != payload.nonce.is_some() {
            return ValidationOutcome::Invalid;
        }

        if now > expires_at.plus_seconds(self.clock_skew_secs) {
            return ValidationOutcome::Expired;
        }

        ValidationOutcome::Valid(ShareAccessContext {
            mode: payload.mode,
            scope_path: payload.scope_path,
            expires_at,
            token: token.to_string(),
            one_time: payload.one_time,
            nonce: payload.nonce,
        })
    }

    fn checked_scope(mode: ShareMode, scope_path: &str) -> ShareResult<String> {
        let Some(scope) = normalize_request_path(scope_path) else {
            return Err(ShareError::InvalidScopePath {
                path: scope_path.to_string(),
                reason: "path contains traversal or forbidden characters".to_string(),
            });
        };
        if scope.is_empty() && mode == ShareMode::File {
            return Err(ShareError::InvalidScopePath {
                path: scope_path.to_string(),
                reason: "a file share needs a file path".to_string(),
            });
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ShareTokenService {
        ShareTokenService::new(MacSecret::new(b"0123456789abcdef".to_vec()).unwrap())
    }

    fn at(unix: i64) -> Timestamp {
        Timestamp::from_unix_seconds(unix).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let svc = service();
        let token = svc
            .create(ShareMode::Directory, "shared-folder", at(10_000), false)
            .unwrap();

        let ctx = svc.validate(&token, at(5_000)).into_context().unwrap();
        assert_eq!(ctx.mode, ShareMode::Directory);
        assert_eq!(ctx.scope_path, "shared-folder");
        assert_eq!(ctx.expires_at.unix_seconds(), 10_000);
        assert!(!ctx.one_time);
        assert!(ctx.nonce.is_none());
        assert_eq!(ctx.token, token);
    }

    #[test]
    fn test_one_time_token_carries_nonce() {
        let svc = service();
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), true)
            .unwrap();
        let ctx = svc.validate(&token, at(5_000)).into_context().unwrap();
        assert!(ctx.one_time);
        assert!(ctx.nonce.is_some());
    }

    #[test]
    fn test_every_single_character_flip_invalidates() {
        let svc = service();
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), false)
            .unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == token {
                continue;
            }
            assert!(
                matches!(svc.validate(&tampered, at(5_000)), ValidationOutcome::Invalid),
                "flip at {i} was accepted"
            );
        }
    }

    #[test]
    fn test_truncation_invalid_not_expired() {
        let svc = service();
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), false)
            .unwrap();
        let truncated = &token[..token.len() - 4];
        assert!(matches!(
            svc.validate(truncated, at(5_000)),
            ValidationOutcome::Invalid
        ));
        assert!(matches!(
            svc.validate("garbage", at(5_000)),
            ValidationOutcome::Invalid
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        let svc = service().with_clock_skew(30);
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), false)
            .unwrap();

        // exactly at expiry: valid
        assert!(svc.validate(&token, at(10_000)).context().is_some());
        // within tolerance: valid
        assert!(svc.validate(&token, at(10_030)).context().is_some());
        // one second past tolerance: expired, not invalid
        assert!(svc.validate(&token, at(10_031)).is_expired());
    }

    #[test]
    fn test_wrong_secret_invalid() {
        let svc = service();
        let other = ShareTokenService::new(MacSecret::new(b"fedcba9876543210".to_vec()).unwrap());
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), false)
            .unwrap();
        assert!(matches!(
            other.validate(&token, at(5_000)),
            ValidationOutcome::Invalid
        ));
    }

    #[test]
    fn test_scope_path_normalized_at_mint() {
        let svc = service();
        let token = svc
            .create(ShareMode::Directory, "/shared//folder/", at(10_000), false)
            .unwrap();
        let ctx = svc.validate(&token, at(5_000)).into_context().unwrap();
        assert_eq!(ctx.scope_path, "shared/folder");
    }

    #[test]
    fn test_traversal_scope_rejected_at_mint() {
        let svc = service();
        assert!(
            svc.create(ShareMode::Directory, "../outside", at(10_000), false)
                .is_err()
        );
        assert!(
            svc.create(ShareMode::File, "", at(10_000), false)
                .is_err()
        );
    }

    #[test]
    fn test_directory_scope_containment() {
        let ctx = ShareAccessContext {
            mode: ShareMode::Directory,
            scope_path: "shared-folder".to_string(),
            expires_at: at(10_000),
            token: String::new(),
            one_time: false,
            nonce: None,
        };
        assert!(ctx.allows("/shared-folder/inner.txt"));
        assert!(ctx.allows("/shared-folder/deep/nested.txt"));
        assert!(ctx.allows("/shared-folder"));
        assert!(!ctx.allows("/private.txt"));
        // prefix on a non-segment boundary must not match
        assert!(!ctx.allows("/shared-folder-evil/file.txt"));
        assert!(!ctx.allows("/shared-folder/../private.txt"));
    }

    #[test]
    fn test_file_scope_exact_only() {
        let ctx = ShareAccessContext {
            mode: ShareMode::File,
            scope_path: "shared-file.txt".to_string(),
            expires_at: at(10_000),
            token: String::new(),
            one_time: false,
            nonce: None,
        };
        assert!(ctx.allows("/shared-file.txt"));
        assert!(!ctx.allows("/shared-file.txt.bak"));
        assert!(!ctx.allows("/other.txt"));
        assert!(!ctx.allows("/shared-file.txt/child"));
    }

    #[test]
    fn test_blanked_token() {
        let svc = service();
        let token = svc
            .create(ShareMode::File, "doc.pdf", at(10_000), true)
            .unwrap();
        let ctx = svc.validate(&token, at(5_000)).into_context().unwrap();
        let blanked = ctx.with_blanked_token();
        assert!(blanked.token.is_empty());
        // scope survives blanking
        assert!(blanked.allows("/doc.pdf"));
    }
}
