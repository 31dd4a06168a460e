// JSON view models rendered by the handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::api::flash::Flash;
use crate::domain::product::{image_web_path, Product};
use crate::domain::validation::FormErrors;

/// Renders `view` as JSON with the given status
pub fn render<T: Serialize>(status: StatusCode, view: T) -> Response {
    (status, Json(view)).into_response()
}

/// Index page: all records plus the messages left by the last action
#[derive(Debug, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub antiforgery_token: String,
}

impl<T> ListView<T> {
    pub fn new(items: Vec<T>, flash: Flash, antiforgery_token: &str) -> Self {
        Self {
            items,
            success_message: flash.success,
            error_message: flash.error,
            antiforgery_token: antiforgery_token.to_string(),
        }
    }
}

/// Read-only page for a single record
#[derive(Debug, Serialize)]
pub struct DetailView<T> {
    pub item: T,
    pub antiforgery_token: String,
}

impl<T> DetailView<T> {
    pub fn new(item: T, antiforgery_token: &str) -> Self {
        Self {
            item,
            antiforgery_token: antiforgery_token.to_string(),
        }
    }
}

/// Create/edit page
///
/// Carries the submitted values back with the errors so nothing the admin
/// typed is lost when the form is re-rendered.
#[derive(Debug, Serialize)]
pub struct FormView<F> {
    pub page_title: String,
    pub form: F,
    pub errors: FormErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub antiforgery_token: String,
}

impl<F> FormView<F> {
    pub fn new(page_title: &str, form: F, errors: FormErrors, antiforgery_token: &str) -> Self {
        Self {
            page_title: page_title.to_string(),
            form,
            errors,
            image_url: None,
            antiforgery_token: antiforgery_token.to_string(),
        }
    }

    pub fn with_image_url(mut self, image_url: String) -> Self {
        self.image_url = Some(image_url);
        self
    }
}

/// A product as displayed, with its image resolved to a URL
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub image_path: Option<String>,
    pub image_url: String,
    pub is_active: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let image_url = image_web_path(product.image_path.as_deref());
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            sku: product.sku,
            image_path: product.image_path,
            image_url,
            is_active: product.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginView {
    pub page_title: &'static str,
    pub return_url: Option<String>,
    pub username: Option<String>,
    pub errors: FormErrors,
    pub antiforgery_token: String,
}

/// Simple titled page, optionally greeting the signed-in admin
#[derive(Debug, Serialize)]
pub struct PageView {
    pub page_title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub antiforgery_token: String,
}

/// Generic failure page, identified for correlation with the logs
#[derive(Debug, Serialize)]
pub struct ErrorView {
    pub page_title: &'static str,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub message: &'static str,
}

impl ErrorView {
    pub fn new() -> Self {
        Self {
            page_title: "Error",
            request_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            message: "An error occurred while processing your request.",
        }
    }
}

impl Default for ErrorView {
    fn default() -> Self {
        Self::new()
    }
}
