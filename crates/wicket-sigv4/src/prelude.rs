//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wicket_sigv4::prelude::*;` to import all essential types.

// Errors
pub use crate::{SigV4Error, SigV4Result};

// Verification
pub use crate::{SigV4Verifier, VerifiedRequest};

// Signing
pub use crate::{AMZ_DATE_FORMAT, Credentials, derive_signing_key, sign_request, string_to_sign};

// Canonicalization
pub use crate::{canonical_query_string, canonical_request, uri_encode};
