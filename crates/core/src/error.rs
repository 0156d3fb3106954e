//! Core error taxonomy.

use thiserror::Error;

/// Result type used across the service and store layers.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core-level error.
///
/// Every store and service failure is one of these variants; the API layer
/// maps each variant to an HTTP status exactly once.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed input (rejected before any store call).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Bad credentials or a missing/unusable bearer token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Role/domain policy denial.
    #[error("{0}")]
    Authorization(String),

    /// An identity (email or organization domain) is already taken.
    #[error("{0}")]
    DuplicateIdentity(String),

    /// A requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Password-reset token is unknown, already consumed, or expired.
    #[error("Invalid or expired token.")]
    InvalidResetToken,

    /// Client exceeded its request window.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The persistent store failed or was unreachable.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A store or upstream call exceeded its deadline (retryable).
    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::DuplicateIdentity(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::UpstreamTimeout(msg.into())
    }
}
