use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};

use super::credentials::CredentialVerifier;
use super::session::{SessionClaims, SessionTokens, SESSION_COOKIE};
use super::AuthError;

/// Signs the administrator in and out and reads the session from requests
///
/// The session lives entirely in a signed, HTTP-only cookie; nothing is
/// kept server-side.
#[derive(Clone)]
pub struct AuthenticationService {
    verifier: Arc<dyn CredentialVerifier>,
    tokens: SessionTokens,
    secure_cookies: bool,
}

impl AuthenticationService {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        session_secret: &str,
        lifetime: Duration,
        secure_cookies: bool,
    ) -> Self {
        Self {
            verifier,
            tokens: SessionTokens::new(session_secret, lifetime),
            secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Checks a submitted username/password pair
    pub async fn validate_credentials(&self, username: &str, password: &str) -> bool {
        let is_valid = self.verifier.verify(username, password).await;
        tracing::info!(username, success = is_valid, "Login attempt");
        is_valid
    }

    /// Starts a session for `username` by adding the session cookie to `jar`
    pub fn sign_in(&self, jar: CookieJar, username: &str) -> Result<CookieJar, AuthError> {
        let token = self.tokens.issue(username)?;
        tracing::info!(username, "User signed in successfully");
        Ok(jar.add(self.session_cookie(token)))
    }

    /// Ends the session by expiring the session cookie
    pub fn sign_out(&self, jar: CookieJar) -> CookieJar {
        tracing::info!("User signed out successfully");
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// Claims of the session carried by `jar`, if it is valid and unexpired
    pub fn current_session(&self, jar: &CookieJar) -> Option<SessionClaims> {
        let cookie = jar.get(SESSION_COOKIE)?;
        match self.tokens.verify(cookie.value()) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }

    pub fn is_authenticated(&self, jar: &CookieJar) -> bool {
        self.current_session(jar).is_some()
    }

    /// A fresh session cookie when `claims` are past half their lifetime
    ///
    /// This gives the session its sliding expiration: any request made in
    /// the second half of the lifetime extends it by a full lifetime.
    pub fn refreshed_cookie(&self, claims: &SessionClaims) -> Option<Cookie<'static>> {
        if !self.tokens.needs_refresh(claims, Utc::now()) {
            return None;
        }
        match self.tokens.issue(&claims.sub) {
            Ok(token) => Some(self.session_cookie(token)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh session token");
                None
            }
        }
    }

    fn session_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = cookie::time::Duration::seconds(self.tokens.lifetime().num_seconds());
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(max_age)
            .build()
    }
}
