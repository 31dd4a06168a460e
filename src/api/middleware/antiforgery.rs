// Double-submit anti-forgery tokens for state-changing requests

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use super::auth::sets_cookie;
use crate::api::errors::ApiError;
use crate::api::state::AppState;

/// Cookie holding the browser's token
pub const ANTIFORGERY_COOKIE: &str = "__RequestVerificationToken";
/// Form field a submission carries the token in
pub const ANTIFORGERY_FIELD: &str = "__RequestVerificationToken";
/// Header alternative to the form field
pub const ANTIFORGERY_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone)]
struct RequestToken(String);

/// Body of forms that carry nothing but the anti-forgery token
#[derive(Debug, Default, Deserialize)]
pub struct AntiForgeryForm {
    #[serde(default, rename = "__RequestVerificationToken")]
    pub token: Option<String>,
}

/// Ensures every browser holds an anti-forgery cookie
///
/// The request's token (existing or newly generated) is made available to
/// handlers through the [`AntiForgery`] extractor.
pub async fn antiforgery_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = jar
        .get(ANTIFORGERY_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());
    let is_new = existing.is_none();
    let token = existing.unwrap_or_else(new_token);

    request.extensions_mut().insert(RequestToken(token.clone()));
    let mut response = next.run(request).await;

    if is_new && !sets_cookie(&response, ANTIFORGERY_COOKIE) {
        let cookie = token_cookie(token, state.auth.secure_cookies());
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(error = %e, "Invalid anti-forgery cookie"),
        }
    }
    response
}

/// Replaces the browser's token, returning the new value
///
/// Called whenever the signed-in identity changes.
pub fn rotate(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    let token = new_token();
    (jar.add(token_cookie(token.clone(), secure)), token)
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ANTIFORGERY_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// The request's anti-forgery token plus any value sent in the header
#[derive(Debug, Clone)]
pub struct AntiForgery {
    token: String,
    header: Option<String>,
}

impl AntiForgery {
    /// Token to embed in rendered forms
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Checks a submitted token (form field, else header) against the cookie
    pub fn verify(&self, submitted: Option<&str>) -> Result<(), ApiError> {
        let submitted = submitted
            .filter(|value| !value.is_empty())
            .or(self.header.as_deref());

        match submitted {
            Some(value) if constant_time_eq(value.as_bytes(), self.token.as_bytes()) => Ok(()),
            Some(_) => {
                tracing::warn!("Anti-forgery token mismatch");
                Err(ApiError::bad_request("Invalid anti-forgery token"))
            }
            None => {
                tracing::warn!("Anti-forgery token missing");
                Err(ApiError::bad_request("Invalid anti-forgery token"))
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AntiForgery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match parts.extensions.get::<RequestToken>() {
            Some(RequestToken(token)) => token.clone(),
            None => {
                tracing::error!("Anti-forgery layer not installed");
                return Err(ApiError::internal_server_error(
                    "An error occurred while processing your request.",
                ));
            }
        };
        let header = parts
            .headers
            .get(ANTIFORGERY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(Self { token, header })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
