use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::domain::user::{NewUser, User};

/// Repository trait for the User aggregate
///
/// Users are hard-deleted: once `delete` returns, the row is gone.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users ordered by name ascending
    async fn list_all(&self) -> RepositoryResult<Vec<User>>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;

    /// Store a new user and return it with its assigned ID
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Replace the mutable fields of an existing user
    ///
    /// Returns `RepositoryError::NotFound` when no row has `user.id`.
    async fn update(&self, user: &User) -> RepositoryResult<User>;

    /// Remove a user; unknown IDs are a no-op
    async fn delete(&self, id: i32) -> RepositoryResult<()>;

    /// Whether any user other than `exclude_id` owns `email` (case-insensitive)
    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> RepositoryResult<bool>;
}
