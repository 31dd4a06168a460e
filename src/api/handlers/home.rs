use std::any::Any;

use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use crate::api::middleware::{AntiForgery, CurrentUser};
use crate::api::views::{render, ErrorView, PageView};

#[derive(Debug, Serialize)]
struct AboutView {
    page_title: &'static str,
    application_name: &'static str,
    version: &'static str,
    description: &'static str,
    technologies: [&'static str; 4],
    antiforgery_token: String,
}

/// GET / and GET /Home/Index
pub async fn index(user: CurrentUser, guard: AntiForgery) -> Response {
    tracing::info!(username = %user.username, "Dashboard accessed");
    render(
        StatusCode::OK,
        PageView {
            page_title: "Dashboard",
            username: Some(user.username),
            message: None,
            antiforgery_token: guard.token().to_string(),
        },
    )
}

/// GET /Home/About
pub async fn about(user: CurrentUser, guard: AntiForgery) -> Response {
    tracing::info!(username = %user.username, "About page accessed");
    render(
        StatusCode::OK,
        AboutView {
            page_title: "About",
            application_name: "Catalog Admin",
            version: env!("CARGO_PKG_VERSION"),
            description: "Administration of the user directory and product catalog.",
            technologies: ["Rust", "axum", "sqlx", "PostgreSQL"],
            antiforgery_token: guard.token().to_string(),
        },
    )
}

/// GET /Home/Privacy
pub async fn privacy(user: CurrentUser, guard: AntiForgery) -> Response {
    render(
        StatusCode::OK,
        PageView {
            page_title: "Privacy Policy",
            username: Some(user.username),
            message: Some("Only the administrator's session and anti-forgery cookies are stored."),
            antiforgery_token: guard.token().to_string(),
        },
    )
}

/// GET /Home/Error
pub async fn error() -> Response {
    render(StatusCode::OK, ErrorView::new())
}

/// Turns a handler panic into the error view
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    let view = ErrorView::new();
    tracing::error!(request_id = %view.request_id, detail, "Handler panicked");

    render(StatusCode::INTERNAL_SERVER_ERROR, view)
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
