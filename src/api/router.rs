use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{account, home, products, users};
use crate::api::middleware::{antiforgery_layer, session_layer};
use crate::api::state::AppState;

/// Largest accepted product form body
///
/// Leaves room above the upload size limit so oversized images reach
/// validation instead of failing at the transport.
pub const PRODUCT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Builds the application router
///
/// `web_root` is the directory whose `images` subtree is served under
/// `/images`; it is the same root uploads are written below.
pub fn build_router(state: AppState, web_root: &Path) -> Router {
    let product_routes = Router::new()
        .route("/Products", get(products::index))
        .route("/Products/Index", get(products::index))
        .route("/Products/Details/:id", get(products::details))
        .route(
            "/Products/Create",
            get(products::create_form).post(products::create),
        )
        .route(
            "/Products/Edit/:id",
            get(products::edit_form).post(products::edit),
        )
        .route("/Products/Delete/:id", post(products::delete))
        .layer(DefaultBodyLimit::max(PRODUCT_BODY_LIMIT));

    Router::new()
        // Account
        .route(
            "/Account/Login",
            get(account::login_form).post(account::login),
        )
        .route("/Account/Logout", post(account::logout))
        .route("/Account/AccessDenied", get(account::access_denied))
        // Home
        .route("/", get(home::index))
        .route("/Home/Index", get(home::index))
        .route("/Home/About", get(home::about))
        .route("/Home/Privacy", get(home::privacy))
        .route("/Home/Error", get(home::error))
        // Users
        .route("/Users", get(users::index))
        .route("/Users/Index", get(users::index))
        .route("/Users/Details/:id", get(users::details))
        .route("/Users/Create", get(users::create_form).post(users::create))
        .route("/Users/Edit/:id", get(users::edit_form).post(users::edit))
        .route("/Users/Delete/:id", post(users::delete))
        // Products
        .merge(product_routes)
        // Session and anti-forgery apply to the pages above only
        .layer(from_fn_with_state(state.clone(), antiforgery_layer))
        .layer(from_fn_with_state(state.clone(), session_layer))
        .route("/health", get(home::health_check))
        .nest_service("/images", ServeDir::new(web_root.join("images")))
        .layer(CatchPanicLayer::custom(home::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
