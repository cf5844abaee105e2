//! Password hashing and identity-token signing.
//!
//! Passwords are hashed with Argon2id and a random salt; the PHC string keeps the
//! algorithm parameters next to the hash. Tokens are HS256 JWTs signed with the
//! process-wide secret from [`AppConfig`](crate::config::AppConfig). Tokens carry no
//! expiry claim and none is enforced.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Claims
///
/// The payload signed into every identity token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The account id. Resolved against the store on every request.
    pub id: Uuid,
    pub username: String,
    /// Informational only; authorization reads the flag from the stored account.
    pub is_admin: bool,
    /// Issued-at (UTC Unix timestamp).
    pub iat: i64,
}

impl Claims {
    pub fn new(id: Uuid, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            username: username.into(),
            is_admin,
            iat: chrono::Utc::now().timestamp(),
        }
    }
}

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Credential(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| ApiError::Credential(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Credential(e.to_string())),
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // No `exp` is issued, so none may be required or checked.
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation
}

/// Sign `claims` into a token string.
pub fn issue_token(claims: &Claims, secret: &str) -> ApiResult<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Credential(e.to_string()))
}

/// Validate a token's signature and decode its claims.
///
/// Any failure (malformed, wrong secret, wrong algorithm) is `InvalidToken`.
pub fn verify_token(token: &str, secret: &str) -> ApiResult<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation())
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            ApiError::InvalidToken
        })
}
