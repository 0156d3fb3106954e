//! Auth-layer error type.

use huddle_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Signature, structure, or claim verification failed.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The token's embedded expiry has elapsed.
    #[error("token expired")]
    TokenExpired,

    /// The hashing primitive failed (malformed stored hash, bad cost).
    #[error("credential hashing failed: {0}")]
    Hash(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenInvalid(_) | AuthError::TokenExpired => {
                CoreError::authentication("Invalid or expired token")
            }
            AuthError::Hash(msg) => CoreError::persistence(format!("credential hashing: {msg}")),
        }
    }
}
