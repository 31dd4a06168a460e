// Repository ports: the contracts the handlers depend on
// Implementations live in the infrastructure layer

pub mod errors;
pub mod product_repository;
pub mod user_repository;

pub use errors::{RepositoryError, RepositoryResult};
pub use product_repository::ProductRepository;
pub use user_repository::UserRepository;
