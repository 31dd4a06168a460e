// Password hashing utilities
// Uses bcrypt so the configured admin password never sits in memory as plain text

use bcrypt::{hash, verify};

use super::AuthError;

pub use bcrypt::DEFAULT_COST;

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
/// * `cost` - bcrypt work factor; use [`DEFAULT_COST`] outside of tests
///
/// # Example
/// ```
/// use catalog_admin::auth::password::hash_password;
///
/// let hash = hash_password("my_password", 4).expect("valid hash");
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(hash(password, cost)?)
}

/// Verifies a password against a bcrypt hash
///
/// The comparison is case-sensitive.
///
/// # Returns
/// * `Ok(bool)` - True if password matches, false otherwise
/// * `Err(AuthError)` - If the hash is malformed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(verify(password, hash)?)
}
