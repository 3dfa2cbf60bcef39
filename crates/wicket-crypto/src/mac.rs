//! HMAC-SHA256 message authentication.
//!
//! The server-held secret that signs share-link payloads lives here as
//! [`MacSecret`]. Verification always recomputes the tag over the received
//! bytes and compares in constant time; a truncated or corrupted tag is
//! indistinguishable from a forged one.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::compare::constant_time_eq;
use crate::encoding::{base64url_decode, base64url_encode};
use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const TAG_LEN: usize = 32;

/// Raw HMAC-SHA256 over `data` with `key`.
///
/// Exposed for the request-signing scheme, whose key-derivation chain
/// feeds each HMAC output back in as the next key.
#[must_use]
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; TAG_LEN] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// A server-held MAC secret.
///
/// Never serialized, never logged; [`std::fmt::Debug`] is redacted and the
/// bytes are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacSecret(Vec<u8>);

impl MacSecret {
    /// Wrap existing secret material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if `bytes` is empty - an empty
    /// HMAC key would make every token forgeable by anyone.
    pub fn new(bytes: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Generate a fresh 32-byte secret.
    #[must_use]
    pub fn generate() -> Self {
        Self(crate::random::random_bytes(TAG_LEN))
    }

    /// Compute the tag for a message.
    #[must_use]
    pub fn tag(&self, message: &[u8]) -> MessageTag {
        MessageTag(hmac_sha256(&self.0, message))
    }

    /// Verify a candidate tag against `message` in constant time.
    ///
    /// Accepts a raw slice so that truncated wire input is rejected by the
    /// same path as a wrong tag.
    #[must_use]
    pub fn verify(&self, message: &[u8], candidate: &[u8]) -> bool {
        constant_time_eq(self.tag(message).as_bytes(), candidate)
    }
}

impl std::fmt::Debug for MacSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacSecret(..)")
    }
}

/// An HMAC-SHA256 tag (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTag([u8; TAG_LEN]);

impl MessageTag {
    /// The raw tag bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }

    /// Encode as unpadded URL-safe base64 for the token wire format.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        base64url_encode(&self.0)
    }

    /// Decode from the token wire format.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidBase64Encoding`] for malformed base64
    /// or [`CryptoError::InvalidTagLength`] when the decoded tag is not
    /// exactly [`TAG_LEN`] bytes.
    pub fn from_base64url(s: &str) -> CryptoResult<Self> {
        let bytes = base64url_decode(s)?;
        let len = bytes.len();
        let arr: [u8; TAG_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidTagLength {
            expected: TAG_LEN,
            actual: len,
        })?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        let secret = MacSecret::generate();
        let tag = secret.tag(b"payload");
        assert!(secret.verify(b"payload", tag.as_bytes()));
    }

    #[test]
    fn test_tampered_message_rejected() {
        let secret = MacSecret::generate();
        let tag = secret.tag(b"payload");
        assert!(!secret.verify(b"payloae", tag.as_bytes()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let a = MacSecret::generate();
        let b = MacSecret::generate();
        let tag = a.tag(b"payload");
        assert!(!b.verify(b"payload", tag.as_bytes()));
    }

    #[test]
    fn test_truncated_tag_rejected() {
        let secret = MacSecret::generate();
        let tag = secret.tag(b"payload");
        assert!(!secret.verify(b"payload", &tag.as_bytes()[..16]));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            MacSecret::new(Vec::new()),
            Err(CryptoError::EmptySecret)
        ));
    }

    #[test]
    fn test_tag_wire_round_trip() {
        let secret = MacSecret::new(b"0123456789abcdef".to_vec()).unwrap();
        let tag = secret.tag(b"msg");
        let wire = tag.to_base64url();
        assert_eq!(MessageTag::from_base64url(&wire).unwrap(), tag);
    }

    #[test]
    fn test_short_wire_tag_rejected() {
        assert!(matches!(
            MessageTag::from_base64url("AAAA"),
            Err(CryptoError::InvalidTagLength { expected: 32, .. })
        ));
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?"
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
