//! Credential primitives: password hashing and signed access tokens
//!
//! # Architecture
//!
//! - Passwords are stored as bcrypt hashes (cost 10); the salt is embedded
//!   in the hash string.
//! - Access tokens are HS256 JWTs carrying only the user id plus the
//!   standard `iat`/`exp` timestamps.
//! - There is no refresh, rotation or revocation: a token is valid until it
//!   expires.
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. No HTTP framework dependencies
//! (Axum, etc.) - those are in the service crate. bcrypt is CPU-bound; async
//! callers should run [`hash_password`] and [`verify_password`] on a blocking
//! thread.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// bcrypt work factor for stored passwords
pub const BCRYPT_COST: u32 = 10;

/// Longest password bcrypt hashes in full; longer input would be truncated
pub const MAX_PASSWORD_BYTES: usize = 72;

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was supplied
    Missing,

    /// Credential is malformed or its signature does not verify
    Invalid,

    /// Credential verified but its expiry has passed
    Expired,

    /// Password exceeds [`MAX_PASSWORD_BYTES`]
    PasswordTooLong,

    /// Password hashing or token signing failed
    Hashing(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing => write!(f, "Missing access token"),
            AuthError::Invalid => write!(f, "Invalid access token"),
            AuthError::Expired => write!(f, "Access token expired"),
            AuthError::PasswordTooLong => {
                write!(f, "Password must be at most {} bytes", MAX_PASSWORD_BYTES)
            }
            AuthError::Hashing(err) => write!(f, "Credential processing failed: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

// ========================================
// Passwords
// ========================================

/// Reject passwords bcrypt would silently truncate
pub fn check_password_length(password: &str) -> Result<(), AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::PasswordTooLong);
    }
    Ok(())
}

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

/// Hash a password with an explicit bcrypt cost (4..=31)
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    check_password_length(password)?;
    bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check a password against a stored hash
///
/// Returns `Ok(false)` on mismatch, including any password longer than
/// [`MAX_PASSWORD_BYTES`]; `Err` only when the stored hash itself is unusable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    if check_password_length(password).is_err() {
        return Ok(false);
    }
    bcrypt::verify(password, stored_hash).map_err(|e| AuthError::Hashing(e.to_string()))
}

// ========================================
// Tokens
// ========================================

/// Claims embedded in an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: i64,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

/// Issues and verifies access tokens with one server secret
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, expiry: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        }
    }

    /// Configured token lifetime
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a token for `user_id`, valid from now for the configured expiry
    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    /// Issue a token as if it had been signed at `issued_at` (Unix seconds)
    pub fn issue_at(&self, user_id: i64, issued_at: i64) -> Result<String, AuthError> {
        let lifetime = i64::try_from(self.expiry.as_secs())
            .map_err(|_| AuthError::Hashing("Token expiry out of range".to_string()))?;

        let claims = Claims {
            id: user_id,
            iat: issued_at,
            exp: issued_at.saturating_add(lifetime),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::Missing);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })
    }
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn test_token_roundtrip_preserves_user_id() {
        let signer = signer();
        let token = signer.issue(42).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = TokenSigner::new("other-secret", Duration::from_secs(3600))
            .issue(1)
            .unwrap();

        assert_eq!(signer().verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let two_hours_ago = Utc::now().timestamp() - 7200;
        let token = signer.issue_at(7, two_hours_ago).unwrap();

        assert_eq!(signer.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let mut token = signer.issue(3).unwrap();
        token.push('x');

        assert_eq!(signer.verify(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn test_garbage_and_empty_tokens() {
        assert_eq!(signer().verify("not-a-token"), Err(AuthError::Invalid));
        assert_eq!(signer().verify(""), Err(AuthError::Missing));
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password_with_cost("hunter2", 4).unwrap();

        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password_with_cost("same", 4).unwrap();
        let b = hash_password_with_cost("same", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let limit = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password_with_cost(&limit, 4).unwrap();
        assert!(verify_password(&limit, &hash).unwrap());

        let longer = format!("{}b", limit);
        assert_eq!(
            hash_password_with_cost(&longer, 4).unwrap_err(),
            AuthError::PasswordTooLong
        );
        assert!(!verify_password(&longer, &hash).unwrap());
    }

    #[test]
    fn test_unusable_stored_hash_is_error() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }
}
