// Domain layer module exports
// Entities, forms, and repository contracts; no HTTP or SQL here

pub mod product;
pub mod repositories;
pub mod user;
pub mod validation;
