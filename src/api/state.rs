use std::sync::Arc;

use crate::auth::AuthenticationService;
use crate::domain::repositories::{ProductRepository, UserRepository};
use crate::infrastructure::storage::FileStorage;

/// Services shared by every handler
///
/// Each dependency is injected as a trait object so tests and alternative
/// backends can be wired in without touching the handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub files: Arc<dyn FileStorage>,
    pub auth: Arc<AuthenticationService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        files: Arc<dyn FileStorage>,
        auth: AuthenticationService,
    ) -> Self {
        Self {
            users,
            products,
            files,
            auth: Arc::new(auth),
        }
    }
}
