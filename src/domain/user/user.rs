use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A managed user record
///
/// # Invariants
/// - `id` is assigned by the store and never changes
/// - `email` is unique across all users, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// A user that has passed validation but has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    /// Attaches the store-assigned id
    pub fn with_id(self, id: i32) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }
}
