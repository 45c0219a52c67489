//! Cryptographic Utilities

use rand::{RngCore, rngs::OsRng};

/// Generate cryptographically secure random bytes
///
/// Fails only when the operating system RNG is unavailable.
pub fn try_random_bytes(len: usize) -> Result<Vec<u8>, rand::Error> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// Non-cryptographic random bytes.
///
/// Only for degraded operation when [`try_random_bytes`] fails. Callers
/// must log that they are running with weaker guarantees.
pub fn fallback_random_bytes(len: usize) -> Vec<u8> {
    let mut rng = fastrand::Rng::new();
    (0..len).map(|_| rng.u8(..)).collect()
}

/// Lowercase hex encoding
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Random string over `alphabet`, `len` characters long.
///
/// Uses the OS RNG and falls back to [`fallback_random_bytes`] the same way
/// token generation does.
pub fn random_string(alphabet: &[u8], len: usize) -> String {
    debug_assert!(!alphabet.is_empty() && alphabet.len() <= 256);
    let bytes = try_random_bytes(len).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "OS RNG unavailable, using non-cryptographic fallback");
        fallback_random_bytes(len)
    });
    bytes
        .iter()
        .map(|b| alphabet[*b as usize % alphabet.len()] as char)
        .collect()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = try_random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);
        // Should not be all zeros (statistically)
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_fallback_random_bytes_length() {
        assert_eq!(fallback_random_bytes(32).len(), 32);
        assert!(fallback_random_bytes(0).is_empty());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(to_hex(&[0u8; 32]).len(), 64);
    }

    #[test]
    fn test_random_string_uses_alphabet() {
        let alphabet = b"ABC";
        let s = random_string(alphabet, 40);
        assert_eq!(s.len(), 40);
        assert!(s.chars().all(|c| "ABC".contains(c)));
    }

    #[test]
    fn test_constant_time_eq() {
        let a = [1u8, 2, 3, 4];
        let b = [1u8, 2, 3, 4];
        let c = [1u8, 2, 3, 5];
        assert!(constant_time_eq(&a, &b));
        assert!(!constant_time_eq(&a, &c));
        assert!(!constant_time_eq(&a, &b[..3]));
    }
}
