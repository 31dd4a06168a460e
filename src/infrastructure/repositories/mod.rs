// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_product_repository;
pub mod postgres_user_repository;

pub use postgres_product_repository::PostgresProductRepository;
pub use postgres_user_repository::PostgresUserRepository;
