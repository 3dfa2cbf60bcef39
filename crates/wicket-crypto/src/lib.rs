//! Wicket Crypto - Cryptographic primitives for the request-authorization gateway.
//!
//! This crate provides:
//! - HMAC-SHA256 message authentication for share-link tokens and request signing
//! - Constant-time comparison for every secret-bearing value
//! - SHA-256 digests for canonical-request hashing
//! - URL-safe base64 codecs for the token wire format
//!
//! # Security Philosophy
//!
//! Nothing in the gateway compares a password, token, or signature with
//! `==`. Every secret-bearing comparison funnels through
//! [`constant_time_eq`], and HMAC verification recomputes the tag rather
//! than trusting anything the wire supplied.
//!
//! # Example
//!
//! ```
//! use wicket_crypto::MacSecret;
//!
//! let secret = MacSecret::generate();
//! let tag = secret.tag(b"payload bytes");
//! assert!(secret.verify(b"payload bytes", tag.as_bytes()));
//! assert!(!secret.verify(b"tampered bytes", tag.as_bytes()));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod compare;
mod digest;
mod encoding;
mod error;
mod mac;
mod random;

pub use compare::{constant_time_eq, constant_time_eq_str};
pub use digest::{sha256, sha256_hex};
pub use encoding::{base64url_decode, base64url_encode};
pub use error::{CryptoError, CryptoResult};
pub use mac::{MacSecret, MessageTag, hmac_sha256};
pub use random::{random_bytes, random_hex};
