//! Wicket SigV4 - Request-signature verification for the machine-client API.
//!
//! Machine clients talk to the file browser's S3-compatible surface with
//! AWS Signature Version 4: a canonical encoding of the request is
//! hashed, a signing key is derived from the account secret through a
//! fixed HMAC chain, and only derived one-way outputs are ever compared.
//! The secret key never appears on the wire.
//!
//! Verification is stateless. The one temporal check is a clock-skew
//! window on the request's declared timestamp.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod canonical;
mod error;
mod signing;
mod verify;

pub use canonical::{canonical_query_string, canonical_request, uri_encode};
pub use error::{SigV4Error, SigV4Result};
pub use signing::{AMZ_DATE_FORMAT, Credentials, derive_signing_key, sign_request, string_to_sign};
pub use verify::{SigV4Verifier, VerifiedRequest};
