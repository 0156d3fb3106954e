//! Password hashing and verification (bcrypt).

use crate::error::AuthError;

/// bcrypt cost factor: balances brute-force resistance against login latency.
pub const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password with a fresh salt.
pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    bcrypt::hash(raw, BCRYPT_COST).map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
/// malformed. Comparison is constant-time inside the primitive.
pub fn verify_password(raw: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(raw, hash).map_err(|e| AuthError::Hash(e.to_string()))
}
