//! Random material for nonces and generated secrets.

use rand::RngCore;

/// `len` bytes from the thread-local CSPRNG.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Hex string of `len` random bytes (twice as many characters).
///
/// One-time share nonces use 16 bytes, enough that collision and guessing
/// are both off the table for a process-lifetime store.
#[must_use]
pub fn random_hex(len: usize) -> String {
    hex::encode(random_bytes(len))
}
