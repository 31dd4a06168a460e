// Signed session tokens carried in the session cookie
// HS256 JWTs with the username as subject and a sliding expiry

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "catalog_session";

/// Session token claims
///
/// # Fields
/// * `sub` - Subject (signed-in username)
/// * `iat` - Issue time (seconds since epoch)
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with one signing secret
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl SessionTokens {
    /// Creates a token issuer
    ///
    /// # Arguments
    /// * `secret` - The signing secret (from configuration)
    /// * `lifetime` - How long a token stays valid after it is issued
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Creates a token for `username`, valid for the configured lifetime
    ///
    /// # Example
    /// ```
    /// use catalog_admin::auth::SessionTokens;
    /// use chrono::Duration;
    ///
    /// let tokens = SessionTokens::new("your-secret-key", Duration::hours(24));
    /// let token = tokens.issue("admin").expect("valid token");
    /// let claims = tokens.verify(&token).expect("valid token");
    /// assert_eq!(claims.sub, "admin");
    /// ```
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    /// Creates a token as if it had been issued at `issued_at`
    pub fn issue_at(&self, username: &str, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verifies the signature and expiry of a token
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        Ok(decode::<SessionClaims>(token, &self.decoding, &self.validation)?.claims)
    }

    /// Whether a valid token is past half its lifetime and should be reissued
    pub fn needs_refresh(&self, claims: &SessionClaims, now: DateTime<Utc>) -> bool {
        let remaining = claims.exp - now.timestamp();
        remaining < self.lifetime.num_seconds() / 2
    }
}
