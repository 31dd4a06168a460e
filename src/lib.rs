//! Catalog Admin
//!
//! A small administration site: one configured administrator signs in and
//! manages a user directory and a product catalog with image uploads.
//! Pages are rendered as JSON view models.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
