use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::product::{NewProduct, Product};
use crate::domain::repositories::{ProductRepository, RepositoryError, RepositoryResult};
use crate::infrastructure::database::RetryPolicy;

/// PostgreSQL implementation of ProductRepository
///
/// Deletion flips `is_active`; the partial unique index on `sku` only covers
/// active rows, so a deleted product's SKU can be reused.
pub struct PostgresProductRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresProductRepository {
    /// Creates a new PostgresProductRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    /// * `retry` - Policy applied to transient connectivity failures
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list_active(&self) -> RepositoryResult<Vec<Product>> {
        self.retry
            .run("list products", || {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, price, sku, image_path, is_active
                    FROM products
                    WHERE is_active
                    ORDER BY name ASC, id ASC
                    "#,
                )
                .fetch_all(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<Product>> {
        self.retry
            .run("find product", || {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, name, description, price, sku, image_path, is_active
                    FROM products
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn create(&self, product: NewProduct) -> RepositoryResult<Product> {
        self.retry
            .run_write("create product", || {
                sqlx::query_as::<_, Product>(
                    r#"
                    INSERT INTO products (name, description, price, sku, image_path, is_active)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, name, description, price, sku, image_path, is_active
                    "#,
                )
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price)
                .bind(&product.sku)
                .bind(&product.image_path)
                .bind(product.is_active)
                .fetch_one(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn update(&self, product: &Product) -> RepositoryResult<Product> {
        self.retry
            .run_write("update product", || {
                sqlx::query_as::<_, Product>(
                    r#"
                    UPDATE products
                    SET name = $2, description = $3, price = $4,
                        sku = $5, image_path = $6, is_active = $7
                    WHERE id = $1
                    RETURNING id, name, description, price, sku, image_path, is_active
                    "#,
                )
                .bind(product.id)
                .bind(&product.name)
                .bind(&product.description)
                .bind(product.price)
                .bind(&product.sku)
                .bind(&product.image_path)
                .bind(product.is_active)
                .fetch_optional(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)?
            .ok_or(RepositoryError::NotFound(product.id))
    }

    async fn soft_delete(&self, id: i32) -> RepositoryResult<()> {
        let result = self
            .retry
            .run_write("soft delete product", || {
                sqlx::query("UPDATE products SET is_active = FALSE WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)?;

        if result.rows_affected() == 0 {
            tracing::debug!(product_id = id, "Soft delete matched no product");
        }

        Ok(())
    }

    async fn sku_exists(&self, sku: &str, exclude_id: Option<i32>) -> RepositoryResult<bool> {
        self.retry
            .run("check product sku", || {
                sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS (
                        SELECT 1 FROM products
                        WHERE sku = $1
                          AND is_active
                          AND ($2::INT IS NULL OR id <> $2)
                    )
                    "#,
                )
                .bind(sku)
                .bind(exclude_id)
                .fetch_one(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
