use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::SET_COOKIE, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::state::AppState;
use crate::auth::SESSION_COOKIE;

/// Path unauthenticated visitors are sent to
pub const LOGIN_PATH: &str = "/Account/Login";

/// The signed-in administrator, resolved by [`session_layer`]
///
/// Using this extractor makes a route require authentication: requests
/// without a valid session are redirected to the login page with a
/// `ReturnUrl` pointing back at the original path.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(user: CurrentUser) -> String {
///     format!("Hello {}", user.username)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let return_url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        tracing::debug!(return_url, "Unauthenticated request redirected to login");

        Err(Redirect::to(&login_redirect(return_url)).into_response())
    }
}

/// Login URL that returns to `return_url` after signing in
pub fn login_redirect(return_url: &str) -> String {
    match serde_urlencoded::to_string([("ReturnUrl", return_url)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

/// Resolves the session cookie for every request
///
/// A valid session is attached to the request as a [`CurrentUser`]. When the
/// session is past half its lifetime, the response carries a renewed cookie
/// unless the handler already changed the session (sign-in or sign-out).
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(claims) = state.auth.current_session(&jar) else {
        return next.run(request).await;
    };

    request.extensions_mut().insert(CurrentUser {
        username: claims.sub.clone(),
    });
    let mut response = next.run(request).await;

    if sets_cookie(&response, SESSION_COOKIE) {
        return response;
    }
    if let Some(cookie) = state.auth.refreshed_cookie(&claims) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
                tracing::debug!(username = %claims.sub, "Session expiry extended");
            }
            Err(e) => tracing::error!(error = %e, "Invalid refreshed session cookie"),
        }
    }
    response
}

/// Whether `response` already sets the cookie called `name`
pub(crate) fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
