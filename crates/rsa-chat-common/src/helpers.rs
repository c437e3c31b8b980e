//! Common helper functions for rsa-chat.

/// Performs a constant-time comparison of two byte slices.
///
/// Used when comparing key material so that the comparison time does not
/// depend on where the first differing byte is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (lhs, rhs) in a.iter().zip(b.iter()) {
        diff |= lhs ^ rhs;
    }
    diff == 0
}

/// Returns true if the string is empty or only whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq_identical() {
        assert!(constant_time_eq(b"key123", b"key123"));
        assert!(constant_time_eq(b"", b""));
        assert!(constant_time_eq(&[0u8; 64], &[0u8; 64]));
    }

    #[test]
    fn test_constant_time_eq_different() {
        assert!(!constant_time_eq(b"key123", b"key124"));
        let mut other = [7u8; 64];
        other[63] = 8;
        assert!(!constant_time_eq(&[7u8; 64], &other));
    }

    #[test]
    fn test_constant_time_eq_different_lengths() {
        assert!(!constant_time_eq(b"short", b"much_longer_slice"));
        assert!(!constant_time_eq(b"a", b""));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(!is_blank("jill"));
    }
}
