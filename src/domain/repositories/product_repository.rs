use async_trait::async_trait;

use super::errors::RepositoryResult;
use crate::domain::product::{NewProduct, Product};

/// Repository trait for the Product aggregate
///
/// Products are soft-deleted. Every read that reflects the active catalog
/// (`list_active`, `sku_exists`) filters on `is_active`; `find_by_id` does
/// not, so deleted products stay retrievable.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Active products ordered by name ascending
    async fn list_active(&self) -> RepositoryResult<Vec<Product>>;

    /// Find a product by ID, active or not
    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;

    /// Store a new product and return it with its assigned ID
    async fn create(&self, product: NewProduct) -> RepositoryResult<Product>;

    /// Replace the mutable fields of an existing product
    async fn update(&self, product: &Product) -> RepositoryResult<Product>;

    /// Mark a product inactive; unknown IDs are treated as already deleted
    async fn soft_delete(&self, id: i32) -> RepositoryResult<()>;

    /// Whether an active product other than `exclude_id` uses `sku`
    async fn sku_exists(&self, sku: &str, exclude_id: Option<i32>) -> RepositoryResult<bool>;
}
