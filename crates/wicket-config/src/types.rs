//! Configuration types for the Wicket authorization gateway.
//!
//! All types in this module are self-contained with no dependencies on
//! other internal wicket crates. Every struct implements [`Default`] with
//! sensible production defaults so that a bare `[section]` header in TOML
//! produces a working configuration. Secret-bearing fields are never
//! serialized back out.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Root configuration for the authorization gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Credential verification (basic, bearer, external delegation).
    pub auth: AuthSection,
    /// Share-link token signing and one-time sessions.
    pub share: ShareSection,
    /// Authentication failure throttling.
    pub throttle: ThrottleSection,
    /// Filesystem root, hide patterns, and download blocking.
    pub policy: PolicySection,
    /// Request-signing verification for the machine-client API surface.
    pub sigv4: SigV4Section,
}

impl GatewayConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if the document does not
    /// deserialize, or the first [`ConfigError::ValidationError`] found.
    pub fn from_toml_str(doc: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(doc).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        crate::validate::validate(&config)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// AuthSection
// ---------------------------------------------------------------------------

/// Credential verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Username for static basic credentials (`None` disables basic auth).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_username: Option<String>,
    /// Password for static basic credentials. Never serialized back out.
    #[serde(skip_serializing)]
    pub basic_password: Option<String>,
    /// Static bearer token (`None` disables bearer auth). Never serialized.
    #[serde(skip_serializing)]
    pub bearer_token: Option<String>,
    /// Header the bearer token is read from. Accepts a raw token or a
    /// `Bearer <token>` value.
    pub bearer_header: String,
    /// Delegate trust to an upstream identity header instead of verifying
    /// credentials locally.
    pub external_auth: bool,
    /// Header carrying the upstream-authenticated identity.
    pub identity_header: String,
    /// Peers allowed to speak for clients (forwarded-for resolution and
    /// external delegation are only honored from these addresses).
    pub trusted_proxies: Vec<IpAddr>,
    /// Paths served without any authentication (health and liveness).
    pub bypass_paths: Vec<String>,
    /// Realm presented in the basic-auth challenge.
    pub realm: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            basic_username: None,
            basic_password: None,
            bearer_token: None,
            bearer_header: "Authorization".to_string(),
            external_auth: false,
            identity_header: "Remote-User".to_string(),
            trusted_proxies: Vec::new(),
            bypass_paths: vec!["/healthz".to_string()],
            realm: "Directory Listing".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ShareSection
// ---------------------------------------------------------------------------

/// Share-link token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareSection {
    /// Secret used to sign share-link payloads (`None` disables share
    /// links). Never serialized back out.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Clock-skew tolerance applied to token and session expiry, in
    /// seconds.
    pub clock_skew_secs: i64,
    /// Upper bound on live one-time sessions before the oldest are swept.
    pub max_sessions: usize,
}

impl Default for ShareSection {
    fn default() -> Self {
        Self {
            secret: None,
            clock_skew_secs: 30,
            max_sessions: 4096,
        }
    }
}

// ---------------------------------------------------------------------------
// ThrottleSection
// ---------------------------------------------------------------------------

/// Authentication failure throttling.
///
/// The window doubles as the lockout duration: once the threshold is
/// reached, further attempts are rejected until the same fixed window
/// elapses. One knob, no second literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSection {
    /// Failures within one window before the client is throttled.
    pub max_failures: u32,
    /// Fixed window length in seconds.
    pub window_secs: i64,
}

impl Default for ThrottleSection {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// PolicySection
// ---------------------------------------------------------------------------

/// Filesystem scope and visibility policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// Root directory all request paths are resolved against.
    pub root: PathBuf,
    /// Glob patterns (`*`, `?`, `**`) for entries hidden from listings
    /// and direct access.
    pub hide_patterns: Vec<String>,
    /// Hide entries whose name starts with a dot.
    pub hide_dotfiles: bool,
    /// Match name globs case-insensitively. Extension patterns (`*.ext`)
    /// are case-insensitive regardless.
    pub case_insensitive_globs: bool,
    /// File extensions (without dot) for which download is refused.
    pub blocked_extensions: Vec<String>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            hide_patterns: Vec::new(),
            hide_dotfiles: true,
            case_insensitive_globs: false,
            blocked_extensions: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// SigV4Section
// ---------------------------------------------------------------------------

/// Request-signing verification for the machine-client API surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigV4Section {
    /// Enable signature verification for API requests.
    pub enabled: bool,
    /// Access key identifier machine clients present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Matching secret key. Never on the wire, never serialized.
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    /// Region component of the credential scope.
    pub region: String,
    /// Service component of the credential scope.
    pub service: String,
    /// Allowed difference between the declared request timestamp and
    /// verifier time, in seconds.
    pub clock_skew_secs: i64,
}

impl Default for SigV4Section {
    fn default() -> Self {
        Self {
            enabled: false,
            access_key_id: None,
            secret_key: None,
            region: "us-east-1".to_string(),
            service: "s3".to_string(),
            clock_skew_secs: 900,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_safe() {
        let config = GatewayConfig::default();
        assert!(config.auth.basic_username.is_none());
        assert!(!config.auth.external_auth);
        assert_eq!(config.throttle.max_failures, 5);
        assert_eq!(config.throttle.window_secs, 60);
        assert_eq!(config.share.clock_skew_secs, 30);
        assert!(config.policy.hide_dotfiles);
        assert!(!config.sigv4.enabled);
    }

    #[test]
    fn test_bare_sections_deserialize() {
        let config = GatewayConfig::from_toml_str("[auth]\n[throttle]\n[policy]\n").unwrap();
        assert_eq!(config.auth.realm, "Directory Listing");
        assert_eq!(config.auth.bypass_paths, vec!["/healthz".to_string()]);
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = GatewayConfig::default();
        config.auth.basic_password = Some("the-basic-password".to_string());
        config.auth.bearer_token = Some("the-bearer-token".to_string());
        config.share.secret = Some("the-share-signing-secret".to_string());
        config.sigv4.secret_key = Some("the-sigv4-secret-key".to_string());

        let out = toml::to_string(&config).unwrap();
        assert!(!out.contains("the-basic-password"));
        assert!(!out.contains("the-bearer-token"));
        assert!(!out.contains("the-share-signing-secret"));
        assert!(!out.contains("the-sigv4-secret-key"));
    }

    #[test]
    fn test_full_document() {
        let doc = r#"
            [auth]
            basic_username = "admin"
            basic_password = "pass"
            trusted_proxies = ["10.0.0.1"]

            [share]
            secret = "0123456789abcdef"

            [throttle]
            max_failures = 3
            window_secs = 120

            [policy]
            root = "/srv/files"
            hide_patterns = ["*.bak", "private/**"]
            blocked_extensions = ["exe"]
        "#;
        let config = GatewayConfig::from_toml_str(doc).unwrap();
        assert_eq!(config.auth.basic_username.as_deref(), Some("admin"));
        assert_eq!(config.throttle.max_failures, 3);
        assert_eq!(config.policy.hide_patterns.len(), 2);
    }
}
