//! URL-safe base64 codecs.
//!
//! Share-link tokens travel in query strings, so the alphabet is the
//! URL-safe one and padding is dropped.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::error::{CryptoError, CryptoResult};

/// Encode bytes as unpadded URL-safe base64.
#[must_use]
pub fn base64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode unpadded URL-safe base64.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidBase64Encoding`] for any malformed input.
pub fn base64url_decode(s: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| CryptoError::InvalidBase64Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let data = b"{\"mode\":\"file\"}";
        let encoded = base64url_encode(data);
        assert_eq!(base64url_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_no_padding_or_unsafe_chars() {
        // 0xfb 0xff forces '+' '/' '=' in the standard alphabet
        let encoded = base64url_encode(&[0xfb, 0xff, 0x01]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(base64url_decode("not base64 at all!").is_err());
    }
}
