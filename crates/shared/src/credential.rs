//! Password hashing
//!
//! Stored form is `<salt>$<hex sha256(salt || password)>`. Digests are
//! compared in constant time.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SEPARATOR: char = '$';

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    hash_with_salt(&salt, password)
}

fn hash_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{}{}{}", salt, SEPARATOR, hex::encode(hasher.finalize()))
}

/// Check a plaintext password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once(SEPARATOR) {
        Some((salt, _)) if !salt.is_empty() => {
            let computed = hash_with_salt(salt, password);
            computed.as_bytes().ct_eq(stored.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matching_password() {
        let stored = hash_password("matkhau123");
        assert!(verify_password("matkhau123", &stored));
        assert!(!verify_password("matkhau124", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password("same", &a));
        assert!(verify_password("same", &b));
    }

    #[test]
    fn test_malformed_stored_hash() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "no-separator"));
        assert!(!verify_password("x", "$digest"));
    }

    #[test]
    fn test_tampered_digest_rejected() {
        let stored = hash_password("matkhau123");
        let mut tampered = stored.clone();
        let last = if tampered.ends_with('0') { '1' } else { '0' };
        tampered.pop();
        tampered.push(last);

        assert!(!verify_password("matkhau123", &tampered));
        assert!(!verify_password("matkhau123", &stored[..stored.len() - 1]));
    }
}
