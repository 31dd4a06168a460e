// Product aggregate: catalog record, admin form, and image path helpers

#![allow(clippy::module_inception)]

pub mod form;
pub mod image_path;
pub mod product;

pub use form::ProductForm;
pub use image_path::image_web_path;
pub use product::{NewProduct, Product};
