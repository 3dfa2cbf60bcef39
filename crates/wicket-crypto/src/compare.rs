//! Fixed-time equality for secret-bearing values.

use subtle::ConstantTimeEq;

/// Compare two byte slices in constant time.
///
/// The length check itself is not secret; the contents are. Two slices of
/// different length compare unequal without examining bytes, matching the
/// behavior every wire format here already leaks (token and signature
/// lengths are public).
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Compare two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_slices() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_unequal_slices() {
        assert!(!constant_time_eq(b"secret", b"secrex"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
        assert!(!constant_time_eq(b"secret", b""));
    }

    #[test]
    fn test_str_compare() {
        assert!(constant_time_eq_str("hunter2", "hunter2"));
        assert!(!constant_time_eq_str("hunter2", "hunter3"));
    }
}
