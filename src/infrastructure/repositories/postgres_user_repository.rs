use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repositories::{RepositoryError, RepositoryResult, UserRepository};
use crate::domain::user::{NewUser, User};
use crate::infrastructure::database::RetryPolicy;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        self.retry
            .run("list users", || {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email
                    FROM users
                    ORDER BY name ASC, id ASC
                    "#,
                )
                .fetch_all(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        self.retry
            .run("find user", || {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, name, email
                    FROM users
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        self.retry
            .run_write("create user", || {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (name, email)
                    VALUES ($1, $2)
                    RETURNING id, name, email
                    "#,
                )
                .bind(&user.name)
                .bind(&user.email)
                .fetch_one(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        self.retry
            .run_write("update user", || {
                sqlx::query_as::<_, User>(
                    r#"
                    UPDATE users
                    SET name = $2, email = $3
                    WHERE id = $1
                    RETURNING id, name, email
                    "#,
                )
                .bind(user.id)
                .bind(&user.name)
                .bind(&user.email)
                .fetch_optional(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)?
            .ok_or(RepositoryError::NotFound(user.id))
    }

    async fn delete(&self, id: i32) -> RepositoryResult<()> {
        self.retry
            .run_write("delete user", || {
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(())
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> RepositoryResult<bool> {
        self.retry
            .run("check user email", || {
                sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS (
                        SELECT 1 FROM users
                        WHERE LOWER(email) = LOWER($1)
                          AND ($2::INT IS NULL OR id <> $2)
                    )
                    "#,
                )
                .bind(email)
                .bind(exclude_id)
                .fetch_one(&self.pool)
            })
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
