//! Common types used throughout the gateway.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp wrapper for consistent handling throughout Wicket.
///
/// Every expiry comparison in the gateway takes an explicit `now` so that
/// tests never have to sleep or patch a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Create a timestamp from unix seconds.
    ///
    /// Returns `None` for values outside the representable range.
    #[must_use]
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Unix seconds since the epoch.
    #[must_use]
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Check if this timestamp is in the past.
    #[must_use]
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }

    /// This timestamp shifted forward by `secs` seconds.
    ///
    /// Saturates instead of panicking on overflow.
    #[must_use]
    pub fn plus_seconds(&self, secs: i64) -> Self {
        self.0
            .checked_add_signed(Duration::seconds(secs))
            .map_or(Self(DateTime::<Utc>::MAX_UTC), Self)
    }

    /// Whole seconds from `self` until `later` (negative if `later` is earlier).
    #[must_use]
    pub fn seconds_until(&self, later: Timestamp) -> i64 {
        later.0.signed_duration_since(self.0).num_seconds()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Unique identifier for a redeemed one-time share session.
///
/// Travels on the wire (query parameter) after a one-time link has been
/// consumed, so [`Display`](fmt::Display) emits the bare UUID and
/// [`SessionId::parse`] accepts exactly that form. The v4 UUID carries
/// 122 random bits, which is what makes the identifier unguessable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a session ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a session ID from its wire form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a denial, carried in security logs and response
/// decisions.
///
/// Malformed input is always an authentication failure, never a server
/// error; expiry is distinguishable from tampering so callers can say
/// "link expired" without re-exposing the signature-validity boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialClass {
    /// Bad header encoding, bad token structure, undecodable credentials.
    MalformedInput,
    /// Signature or credential mismatch.
    CredentialMismatch,
    /// Was valid once, now past its expiry plus tolerance.
    Expired,
    /// Valid trust material presented for the wrong resource.
    ScopeViolation,
    /// Failure-rate throttle tripped for this client.
    Throttled,
}

impl fmt::Display for DenialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MalformedInput => "malformed-input",
            Self::CredentialMismatch => "credential-mismatch",
            Self::Expired => "expired",
            Self::ScopeViolation => "scope-violation",
            Self::Throttled => "throttled",
        };
        write!(f, "{s}")
    }
}
