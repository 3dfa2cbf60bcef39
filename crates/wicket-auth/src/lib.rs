//! Wicket Auth - Credential verification and the gateway decision surface.
//!
//! Every inbound request is judged here before any collaborator touches
//! the filesystem. Four trust mechanisms are consulted in a fixed,
//! security-relevant order:
//!
//! 1. operational bypass paths
//! 2. share tokens and one-time sessions (query string)
//! 3. static bearer token
//! 4. external delegation behind trusted proxies
//! 5. static basic credentials
//!
//! A share token that is present but invalid falls through to credential
//! checks rather than hard-failing: a malformed link must not lock out a
//! legitimate credentialed user. Every local credential failure feeds the
//! fixed-window throttle before the denial goes out.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod credentials;
mod error;
mod gateway;
mod throttle;
mod verifier;

pub use credentials::{CredentialParseError, extract_bearer, parse_basic_authorization};
pub use error::{AuthError, AuthResult};
pub use gateway::{DenialResponse, Gateway, GatewayVerdict};
pub use throttle::{FailureThrottle, ThrottleDecision};
pub use verifier::{AuthDecision, Authenticator, SESSION_PARAM, TOKEN_PARAM};
