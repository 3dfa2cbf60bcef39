//! Wicket Share - Signed, time-boxed capability tokens ("share links").
//!
//! A share link grants scoped access to a file or directory subtree
//! without a username or password. Tokens are:
//! - HMAC-SHA256 signed by a server-held secret
//! - Scoped to an exact file or a directory subtree
//! - Time-bounded, with a clock-skew tolerance
//! - Optionally one-time: the embedded nonce can be redeemed exactly once
//!
//! The wire form is `base64url(payload json) "." base64url(tag)`. The
//! payload is immutable once signed; any bit change invalidates the tag,
//! and tampering is indistinguishable from malformed input by design.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod store;
mod token;

pub use error::{ShareError, ShareResult};
pub use store::{OneTimeSession, RedemptionStore};
pub use token::{
    DEFAULT_CLOCK_SKEW_SECS, ShareAccessContext, ShareMode, ShareTokenService, ValidationOutcome,
};
