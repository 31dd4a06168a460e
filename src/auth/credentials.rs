use async_trait::async_trait;

use super::password::{hash_password, verify_password, DEFAULT_COST};
use super::AuthError;
use crate::config::AdminConfig;

/// Checks a submitted username/password pair
///
/// Session handling only depends on this trait, so the fixed demo account
/// can be swapped for a real identity provider.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts exactly one configured account
///
/// The username is compared case-insensitively; the password is checked
/// against a bcrypt hash, which is case-sensitive.
#[derive(Debug, Clone)]
pub struct FixedCredentialVerifier {
    username: String,
    password_hash: String,
}

impl FixedCredentialVerifier {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Builds a verifier from a plaintext password, hashing it with `cost`
    pub fn from_password(
        username: impl Into<String>,
        password: &str,
        cost: u32,
    ) -> Result<Self, AuthError> {
        Ok(Self::new(username, hash_password(password, cost)?))
    }

    /// Builds the verifier for the configured administrator
    pub fn from_config(admin: &AdminConfig) -> Result<Self, AuthError> {
        match (&admin.password_hash, &admin.password) {
            (Some(hash), _) => Ok(Self::new(admin.username.clone(), hash.clone())),
            (None, Some(password)) => {
                Self::from_password(admin.username.clone(), password, DEFAULT_COST)
            }
            // No password configured: nothing can match an empty hash
            (None, None) => Ok(Self::new(admin.username.clone(), String::new())),
        }
    }
}

#[async_trait]
impl CredentialVerifier for FixedCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> bool {
        let username_matches = username.to_lowercase() == self.username.to_lowercase();

        // bcrypt is CPU-bound; keep it off the async workers
        let password = password.to_string();
        let hash = self.password_hash.clone();
        let password_matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(AuthError::from)
                .and_then(|result| result);

        match password_matches {
            Ok(matches) => username_matches && matches,
            Err(e) => {
                tracing::error!(error = %e, "Password verification failed");
                false
            }
        }
    }
}
