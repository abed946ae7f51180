//! Typed form validation results.
//!
//! Request DTOs derive [`validator::Validate`]; [`validate_form`] turns the
//! outcome into either the DTO itself or a flat list of field errors that a
//! form page can render inline next to each input.

use serde::Serialize;
use validator::{Validate, ValidationErrors};

/// A single error attached to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name (`text`, `group`, `image`, ...).
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// All errors produced while validating one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    /// Create an empty error list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Error list with a single entry.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append an error for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Merge another list into this one.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// `true` when no field failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// `true` when `field` has at least one error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.for_field(field).next().is_some()
    }

    /// All errors in submission order.
    #[must_use]
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// `Ok(())` if empty, otherwise the errors.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| default_message(&err.code), ToString::to_string);
                fields.push((field.to_string(), message));
            }
        }
        // HashMap iteration order is unstable.
        fields.sort();

        let mut out = Self::new();
        for (field, message) in fields {
            out.add(&field, message);
        }
        out
    }
}

fn default_message(code: &str) -> String {
    match code {
        "length" => "Invalid length".to_string(),
        "required" => "This field is required".to_string(),
        other => format!("Invalid value ({other})"),
    }
}

/// Validate a request DTO.
///
/// Returns the DTO unchanged on success, or the collected field errors.
pub fn validate_form<T: Validate>(form: T) -> Result<T, FormErrors> {
    match form.validate() {
        Ok(()) => Ok(form),
        Err(errors) => Err(errors.into()),
    }
}
