use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::{Validate, ValidationError};

use super::product::{NewProduct, Product};
use crate::domain::validation::{normalize_input, FormErrors};

/// Message shown when another active product already uses the submitted SKU
pub const DUPLICATE_SKU: &str = "SKU already exists. Please enter a unique SKU.";

const PRICE_RANGE_MESSAGE: &str = "Price must be between $0.01 and $999,999.99";

/// Lowest accepted price, inclusive
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// Highest accepted price, inclusive
pub fn max_price() -> Decimal {
    Decimal::new(99_999_999, 2)
}

/// Create/edit form for a product
///
/// `price` keeps the raw submitted text so an unparseable value can be
/// echoed back to the admin alongside the error. `image_path` is the image
/// currently stored for the product and is display-only.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProductForm {
    pub id: i32,

    #[validate(
        required(message = "Product name is required"),
        length(max = 100, message = "Product name cannot exceed 100 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: String,

    #[validate(
        required(message = "SKU is required"),
        length(max = 50, message = "SKU cannot exceed 50 characters")
    )]
    pub sku: Option<String>,

    pub image_path: Option<String>,

    pub is_active: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            id: 0,
            name: None,
            description: None,
            price: String::new(),
            sku: None,
            image_path: None,
            is_active: true,
        }
    }
}

impl ProductForm {
    pub fn is_edit(&self) -> bool {
        self.id > 0
    }

    pub fn page_title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Product"
        } else {
            "Add New Product"
        }
    }

    /// Trims text fields so blank input counts as missing
    pub fn normalized(self) -> Self {
        Self {
            name: normalize_input(self.name),
            description: normalize_input(self.description),
            price: self.price.trim().to_string(),
            sku: normalize_input(self.sku),
            ..self
        }
    }

    /// Validates the form and produces the product fields to store
    ///
    /// The returned value never carries an image; uploads are attached by
    /// the caller once the file has been written.
    pub fn to_new_product(&self) -> Result<NewProduct, FormErrors> {
        self.validate().map_err(FormErrors::from)?;
        let price = Decimal::from_str(&self.price).map_err(|_| {
            let mut errors = FormErrors::new();
            errors.add("price", "Price must be a number");
            errors
        })?;

        Ok(NewProduct {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone(),
            price: price.round_dp(2),
            sku: self.sku.clone().unwrap_or_default(),
            image_path: None,
            is_active: self.is_active,
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: Some(product.name.clone()),
            description: product.description.clone(),
            price: product.price.to_string(),
            sku: Some(product.sku.clone()),
            image_path: product.image_path.clone(),
            is_active: product.is_active,
        }
    }
}

fn price_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_price(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(price_error("required", "Price is required"));
    }
    let price =
        Decimal::from_str(value).map_err(|_| price_error("number", "Price must be a number"))?;
    if price < min_price() || price > max_price() {
        return Err(price_error("range", PRICE_RANGE_MESSAGE));
    }
    Ok(())
}
