// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod views;

pub use router::build_router;
pub use state::AppState;
