use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::{NewUser, User};
use crate::domain::validation::{normalize_input, FormErrors};

/// Message shown when another user already owns the submitted email
pub const DUPLICATE_EMAIL: &str = "Email already exists. Please enter a unique email address.";

/// Create/edit form for a user, as submitted by the admin
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserForm {
    #[serde(default)]
    pub id: i32,

    #[validate(
        required(message = "Name is required"),
        length(max = 100, message = "Name cannot exceed 100 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Please enter a valid email address"),
        length(max = 255, message = "Email cannot exceed 255 characters")
    )]
    pub email: Option<String>,

    #[serde(
        default,
        rename = "__RequestVerificationToken",
        skip_serializing
    )]
    pub antiforgery_token: Option<String>,
}

impl UserForm {
    /// Trims every text field so blank input counts as missing
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            name: normalize_input(self.name),
            email: normalize_input(self.email),
            antiforgery_token: self.antiforgery_token,
        }
    }

    /// Validates the form and produces the record to store
    pub fn to_new_user(&self) -> Result<NewUser, FormErrors> {
        self.validate().map_err(FormErrors::from)?;
        Ok(NewUser {
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        })
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            antiforgery_token: None,
        }
    }
}
