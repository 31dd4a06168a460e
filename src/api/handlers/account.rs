use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::middleware::antiforgery::{rotate, AntiForgeryForm};
use crate::api::middleware::{AntiForgery, CurrentUser};
use crate::api::state::AppState;
use crate::api::views::{render, LoginView, PageView};
use crate::domain::validation::{normalize_input, FormErrors};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default, rename = "ReturnUrl", alias = "returnUrl")]
    pub return_url: Option<String>,
}

/// Sign-in form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default, alias = "Username")]
    #[validate(required(message = "Username is required"))]
    pub username: Option<String>,

    #[serde(default, alias = "Password")]
    #[validate(required(message = "Password is required"))]
    pub password: Option<String>,

    #[serde(default, rename = "ReturnUrl", alias = "returnUrl")]
    pub return_url: Option<String>,

    #[serde(default, rename = "__RequestVerificationToken")]
    pub antiforgery_token: Option<String>,
}

impl LoginForm {
    /// Trims the username; the password is only checked for presence
    fn normalized(self) -> Self {
        Self {
            username: normalize_input(self.username),
            password: self.password.filter(|p| !p.trim().is_empty()),
            ..self
        }
    }
}

/// `return_url` if it stays on this site
///
/// Only rooted paths are accepted; protocol-relative (`//host`) and
/// backslash forms are treated as external.
pub fn safe_return_url(return_url: Option<&str>) -> Option<&str> {
    let url = return_url?;
    let mut chars = url.chars();
    match (chars.next(), chars.next()) {
        (Some('/'), None) => Some(url),
        (Some('/'), Some(second)) if second != '/' && second != '\\' => Some(url),
        _ => None,
    }
}

fn login_view(form: &LoginForm, errors: FormErrors, token: &str) -> LoginView {
    LoginView {
        page_title: "Login",
        return_url: form.return_url.clone(),
        username: form.username.clone(),
        errors,
        antiforgery_token: token.to_string(),
    }
}

/// GET /Account/Login
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
    guard: AntiForgery,
    Query(query): Query<LoginQuery>,
) -> Response {
    if state.auth.is_authenticated(&jar) {
        return Redirect::to("/").into_response();
    }

    let form = LoginForm {
        return_url: query.return_url,
        ..LoginForm::default()
    };
    render(
        StatusCode::OK,
        login_view(&form, FormErrors::new(), guard.token()),
    )
}

/// POST /Account/Login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    guard: AntiForgery,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.antiforgery_token.as_deref())?;
    let form = form.normalized();

    if let Err(errors) = form.validate() {
        return Ok(render(
            StatusCode::UNPROCESSABLE_ENTITY,
            login_view(&form, errors.into(), guard.token()),
        ));
    }

    let username = form.username.clone().unwrap_or_default();
    let password = form.password.clone().unwrap_or_default();
    if !state.auth.validate_credentials(&username, &password).await {
        let mut errors = FormErrors::new();
        errors.add_form_error(INVALID_CREDENTIALS);
        return Ok(render(
            StatusCode::UNAUTHORIZED,
            login_view(&form, errors, guard.token()),
        ));
    }

    let jar = state.auth.sign_in(jar, &username).map_err(|e| {
        tracing::error!(error = %e, username = %username, "Failed to issue session");
        ApiError::internal_server_error("An error occurred while processing your request.")
    })?;
    let (jar, _) = rotate(jar, state.auth.secure_cookies());

    let target = safe_return_url(form.return_url.as_deref()).unwrap_or("/");
    Ok((jar, Redirect::to(target)).into_response())
}

/// POST /Account/Logout
///
/// Open to anonymous requests so an expired session can still sign out.
pub async fn logout(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    jar: CookieJar,
    guard: AntiForgery,
    Form(form): Form<AntiForgeryForm>,
) -> Result<Response, ApiError> {
    guard.verify(form.token.as_deref())?;

    if let Some(user) = user {
        tracing::debug!(username = %user.username, "Signing out");
    }
    let jar = state.auth.sign_out(jar);
    let (jar, _) = rotate(jar, state.auth.secure_cookies());

    Ok((jar, Redirect::to("/Account/Login")).into_response())
}

/// GET /Account/AccessDenied
pub async fn access_denied(guard: AntiForgery) -> Response {
    render(
        StatusCode::OK,
        PageView {
            page_title: "Access Denied",
            username: None,
            message: Some("You do not have permission to access this resource."),
            antiforgery_token: guard.token().to_string(),
        },
    )
}
