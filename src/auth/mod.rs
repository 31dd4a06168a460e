// Authentication: credential verification and signed session cookies

pub mod credentials;
pub mod password;
pub mod service;
pub mod session;

pub use credentials::{CredentialVerifier, FixedCredentialVerifier};
pub use service::AuthenticationService;
pub use session::{SessionClaims, SessionTokens, SESSION_COOKIE};

use thiserror::Error;

/// Errors raised while hashing passwords or handling session tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password verification task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
