//! Password-reset token generation and hashing.
//!
//! The plaintext token travels out-of-band (email) exactly once and is never
//! persisted; only its SHA-256 digest is stored, alongside an expiry.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Reset tokens are consumable for one hour.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// A freshly generated reset token: the plaintext for delivery and the
/// digest for storage.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub plain: String,
    pub hashed: String,
}

/// Generate a high-entropy reset token (32 random bytes, hex-encoded).
pub fn generate_reset_token() -> IssuedResetToken {
    let bytes: [u8; 32] = rand::rng().random();
    let plain = hex::encode(bytes);
    let hashed = hash_reset_token(&plain);
    IssuedResetToken { plain, hashed }
}

/// SHA-256 hex digest of a plaintext reset token — the stored form.
pub fn hash_reset_token(plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_is_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.plain.len(), 64);
        assert!(token.plain.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn stored_hash_matches_rehash_of_plaintext() {
        let token = generate_reset_token();
        assert_eq!(hash_reset_token(&token.plain), token.hashed);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_reset_token().plain, generate_reset_token().plain);
    }

    #[test]
    fn digest_is_deterministic_and_discriminating() {
        assert_eq!(hash_reset_token("abc"), hash_reset_token("abc"));
        assert_ne!(hash_reset_token("abc"), hash_reset_token("abd"));
    }
}
