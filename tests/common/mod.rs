//! Shared fixtures for the HTTP integration suites
//!
//! The router is driven with `oneshot` over in-memory repositories and a
//! temporary web root, so these suites need no database.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use catalog_admin::api::{build_router, AppState};
use catalog_admin::auth::{AuthenticationService, FixedCredentialVerifier};
use catalog_admin::domain::product::{NewProduct, Product};
use catalog_admin::domain::repositories::{
    ProductRepository, RepositoryError, RepositoryResult, UserRepository,
};
use catalog_admin::domain::user::{NewUser, User};
use catalog_admin::infrastructure::storage::LocalFileStorage;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for oneshot

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password@123";
pub const TOKEN_FIELD: &str = "__RequestVerificationToken";
pub const SESSION_SECRET: &str = "integration-test-secret";

fn store_failure() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

/// User store backed by a vector
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
    fail_writes: AtomicBool,
}

impl InMemoryUsers {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, name: &str, email: &str) -> User {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        };
        rows.push(user.clone());
        user
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_writes(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(store_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        let mut users = self.rows.lock().unwrap().clone();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        self.check_writes()?;
        Ok(self.seed(&user.name, &user.email))
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound(user.id))?;
        *row = user.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        self.check_writes()?;
        self.rows.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> RepositoryResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != exclude_id))
    }
}

/// Product store backed by a vector; deletes only flip `is_active`
#[derive(Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
    fail_writes: AtomicBool,
}

impl InMemoryProducts {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, name: &str, sku: &str, image_path: Option<&str>) -> Product {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = Product {
            id,
            name: name.to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            sku: sku.to_string(),
            image_path: image_path.map(str::to_string),
            is_active: true,
        };
        rows.push(product.clone());
        product
    }

    pub fn get(&self, id: i32) -> Option<Product> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn all(&self) -> Vec<Product> {
        self.rows.lock().unwrap().clone()
    }

    fn check_writes(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(store_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn list_active(&self) -> RepositoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Product>> {
        Ok(self.get(id))
    }

    async fn create(&self, product: NewProduct) -> RepositoryResult<Product> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = product.with_id(id);
        rows.push(product.clone());
        Ok(product)
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(RepositoryError::NotFound(product.id))?;
        *row = product.clone();
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: i32) -> RepositoryResult<()> {
        self.check_writes()?;
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|p| p.id == id) {
            row.is_active = false;
        }
        Ok(())
    }

    async fn sku_exists(&self, sku: &str, exclude_id: Option<i32>) -> RepositoryResult<bool> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.is_active && p.sku == sku && Some(p.id) != exclude_id))
    }
}

/// A response with its body collected
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// `Set-Cookie` headers for the cookie called `name`
    pub fn cookies_named(&self, name: &str) -> Vec<&str> {
        let prefix = format!("{name}=");
        self.set_cookies
            .iter()
            .map(String::as_str)
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Messages for `field` in a rendered form view
    pub fn errors_for(&self, field: &str) -> Vec<String> {
        self.json()["errors"][field]
            .as_array()
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The application plus a browser-like cookie store
pub struct TestApp {
    router: Router,
    pub users: Arc<InMemoryUsers>,
    pub products: Arc<InMemoryProducts>,
    pub web_root: TempDir,
    cookies: BTreeMap<String, String>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repositories(
            Arc::new(InMemoryUsers::default()),
            Arc::new(InMemoryProducts::default()),
        )
    }

    pub fn with_repositories(users: Arc<InMemoryUsers>, products: Arc<InMemoryProducts>) -> Self {
        let web_root = TempDir::new().expect("temp web root");
        let verifier = FixedCredentialVerifier::from_password(ADMIN_USERNAME, ADMIN_PASSWORD, 4)
            .expect("hash admin password");
        let auth = AuthenticationService::new(
            Arc::new(verifier),
            SESSION_SECRET,
            chrono::Duration::hours(24),
            false,
        );
        let state = AppState::new(
            users.clone(),
            products.clone(),
            Arc::new(LocalFileStorage::new(web_root.path())),
            auth,
        );

        Self {
            router: build_router(state, web_root.path()),
            users,
            products,
            web_root,
            cookies: BTreeMap::new(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Stores a cookie as if a previous response had set it
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    /// Current anti-forgery token, fetching a page first if none was issued
    pub async fn token(&mut self) -> String {
        if self.cookie(TOKEN_FIELD).is_none() {
            self.get("/Account/Login").await;
        }
        self.cookie(TOKEN_FIELD).expect("anti-forgery cookie").to_string()
    }

    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let (mut parts, body) = request.into_parts();
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            parts
                .headers
                .insert(header::COOKIE, header_value.parse().unwrap());
        }

        let response = self
            .router
            .clone()
            .oneshot(Request::from_parts(parts, body))
            .await
            .unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        for raw in &set_cookies {
            let cookie = cookie::Cookie::parse(raw.clone()).unwrap();
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            location,
            set_cookies,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Posts an urlencoded form exactly as given
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Posts an urlencoded form with the current anti-forgery token added
    pub async fn submit_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self.token().await;
        let mut fields = fields.to_vec();
        fields.push((TOKEN_FIELD, token.as_str()));
        self.post_form(uri, &fields).await
    }

    /// Posts a multipart form with the current anti-forgery token added
    pub async fn submit_multipart(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let token = self.token().await;
        let mut fields = fields.to_vec();
        fields.push((TOKEN_FIELD, token.as_str()));

        let boundary = "----catalog-admin-test-boundary";
        let mut body = Vec::new();
        for (name, value) in &fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"image_file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Signs in as the configured administrator
    pub async fn login(&mut self) {
        let response = self
            .submit_form(
                "/Account/Login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
    }
}
