//! Bearer-token issuance and verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use huddle_core::{Role, User};

use crate::error::AuthError;

/// Embedded claim lifetime. Independent of the session-cookie lifetime: the
/// cookie may outlive this claim, in which case verification fails and the
/// caller must treat it as "re-authenticate".
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claim set proving identity without a server-side session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — user row id.
    pub sub: i64,
    pub email: String,
    pub organization_id: i64,
    pub role: Role,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for a user as of `now`.
    pub fn for_user(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            sub: user.id.as_i64(),
            email: user.email.clone(),
            organization_id: user.organization_id.as_i64(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        }
    }
}

/// Sign a claim set with the server secret.
pub fn encode(claims: &Claims, secret: &[u8]) -> Result<String, AuthError> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenInvalid(e.to_string()))
}

/// Issue a bearer token for a user, valid for [`TOKEN_TTL_SECS`] from now.
pub fn issue_token(user: &User, secret: &[u8]) -> Result<String, AuthError> {
    encode(&Claims::for_user(user, Utc::now()), secret)
}

/// Verify signature and expiry, returning the embedded claims.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid(e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::{OrgId, UserId};

    const SECRET: &[u8] = b"test-secret";

    fn test_user() -> User {
        User {
            id: UserId::from_i64(7),
            name: "Alice".into(),
            email: "alice@acme.com".into(),
            password_hash: Some("$2b$10$irrelevant".into()),
            organization_id: OrgId::from_i64(3),
            role: Role::Admin,
            reset_token: None,
            reset_token_expires: None,
        }
    }

    #[test]
    fn issue_then_verify_round_trips_identity() {
        let user = test_user();
        let token = issue_token(&user, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "alice@acme.com");
        assert_eq!(claims.organization_id, 3);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn expired_token_is_rejected_distinctly() {
        let user = test_user();
        // Issued two hours ago, so the 1h claim has elapsed (beyond leeway).
        let stale = Claims::for_user(&user, Utc::now() - Duration::hours(2));
        let token = encode(&stale, SECRET).unwrap();

        assert_eq!(verify_token(&token, SECRET), Err(AuthError::TokenExpired));
    }

    #[test]
    fn forged_signature_is_rejected() {
        let user = test_user();
        let token = issue_token(&user, SECRET).unwrap();
        assert!(matches!(
            verify_token(&token, b"other-secret"),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token("not.a.jwt", SECRET),
            Err(AuthError::TokenInvalid(_))
        ));
    }
}
