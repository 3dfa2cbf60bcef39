//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_crypto::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use wicket_crypto::prelude::*;
//!
//! let secret = MacSecret::generate();
//! let tag = secret.tag(b"payload");
//! assert!(secret.verify(b"payload", tag.as_bytes()));
//! assert!(constant_time_eq(b"a", b"a"));
//! ```

// Errors
pub use crate::{CryptoError, CryptoResult};

// Message authentication
pub use crate::{MacSecret, MessageTag, hmac_sha256};

// Comparison
pub use crate::{constant_time_eq, constant_time_eq_str};

// Digests
pub use crate::{sha256, sha256_hex};

// Encoding
pub use crate::{base64url_decode, base64url_encode};
