use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidationErrors;

/// Key under which errors that belong to the whole form are stored.
pub const FORM_LEVEL: &str = "";

/// Field-level validation messages collected for a submitted form
///
/// Mirrors what a form view needs to render inline errors: a map from field
/// name to the messages for that field. Messages that are not tied to a
/// single field (bad credentials, persistence failures) live under
/// [`FORM_LEVEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for a single field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Adds a message that applies to the form as a whole
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.add(FORM_LEVEL, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, empty if the field is valid
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, failures) in errors.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                form_errors.add(field.to_string(), message);
            }
        }
        form_errors
    }
}

/// Trims a submitted text value, treating blank input as absent
pub fn normalize_input(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
