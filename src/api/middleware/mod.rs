// Request middleware and the extractors that read what it attaches

pub mod antiforgery;
pub mod auth;

pub use antiforgery::{antiforgery_layer, AntiForgery, ANTIFORGERY_COOKIE, ANTIFORGERY_FIELD};
pub use auth::{session_layer, CurrentUser};
