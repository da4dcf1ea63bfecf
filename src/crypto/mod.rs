pub mod password;
pub mod token;

pub use password::PasswordHashing;
pub use token::{Claims, TokenIssuer};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compares SHA-256 digests in constant time, so neither content nor length
/// leaks through timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let hash_a = Sha256::digest(a);
    let hash_b = Sha256::digest(b);
    hash_a.ct_eq(&hash_b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"fleet-42", b"fleet-42"));
        assert!(!constant_time_eq(b"fleet-42", b"fleet-43"));
        assert!(!constant_time_eq(b"fleet", b"fleet-42"));
    }
}
