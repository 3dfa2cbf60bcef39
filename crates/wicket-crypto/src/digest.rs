//! SHA-256 digests.
//!
//! Used for canonical-request hashing in the request-signing scheme. The
//! share-link path never hashes directly; it goes through HMAC.

use sha2::{Digest, Sha256};

/// SHA-256 digest of `data`.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Lowercase hex encoding of the SHA-256 digest of `data`.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
