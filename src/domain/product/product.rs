use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog product
///
/// # Invariants
/// - `sku` is unique among products with `is_active = true`
/// - A deleted product keeps its row with `is_active = false`
/// - `image_path` is relative to the web root, using `/` separators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub image_path: Option<String>,
    pub is_active: bool,
}

/// A validated product that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sku: String,
    pub image_path: Option<String>,
    pub is_active: bool,
}

impl NewProduct {
    pub fn with_id(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            sku: self.sku,
            image_path: self.image_path,
            is_active: self.is_active,
        }
    }
}

impl Product {
    /// Copies the editable fields of `changes` onto this product
    ///
    /// The id and the stored image path are left alone; image replacement is
    /// decided separately once an upload has succeeded.
    pub fn apply(&mut self, changes: NewProduct) {
        self.name = changes.name;
        self.description = changes.description;
        self.price = changes.price;
        self.sku = changes.sku;
        self.is_active = changes.is_active;
    }
}
