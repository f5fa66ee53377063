//! Attribute validation feeding 422 error documents.
//!
//! ```rust,ignore
//! use jsonapicrate::validation::{Validatable, ValidationErrors, validators};
//!
//! impl Validatable for NewPost {
//!     fn validate(&self) -> Result<(), ValidationErrors> {
//!         let mut errors = ValidationErrors::new();
//!         errors.check(validators::validate_required("title", &self.title));
//!         errors.check(validators::validate_range("score", self.score, Some(0), Some(5)));
//!         errors.result()
//!     }
//! }
//! ```

use serde::Serialize;
use std::fmt;

use crate::document::error::{ErrorObject, ErrorSource};

/// One invalid attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// JSON pointer to the attribute inside the request document.
    #[must_use]
    pub fn pointer(&self) -> String {
        format!("/data/attributes/{}", self.field)
    }

    #[must_use]
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            status: Some("422".to_string()),
            code: Some("invalid_attribute".to_string()),
            title: Some("Invalid attribute".to_string()),
            detail: Some(self.message.clone()),
            source: Some(ErrorSource::pointer(self.pointer())),
            ..ErrorObject::default()
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records the error of a failed validator, if any.
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// # Errors
    ///
    /// Returns `self` when at least one error was collected.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by request payloads that are checked before they reach the data
/// source. All failing attributes are reported together.
pub trait Validatable {
    /// # Errors
    ///
    /// Every attribute that failed validation.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Length in characters, inclusive bounds.
    ///
    /// # Errors
    ///
    /// When `value` is shorter than `min` or longer than `max`.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();
        if let Some(min) = min.filter(|min| len < *min) {
            return Err(ValidationError::new(field, format!("Must be at least {min} characters")));
        }
        if let Some(max) = max.filter(|max| len > *max) {
            return Err(ValidationError::new(field, format!("Must be at most {max} characters")));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// When `value` lies outside the inclusive bounds.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min) = min.filter(|min| value < *min) {
            return Err(ValidationError::new(field, format!("Must be at least {min}")));
        }
        if let Some(max) = max.filter(|max| value > *max) {
            return Err(ValidationError::new(field, format!("Must be at most {max}")));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// When `value` is blank.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This field is required"));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// When `value` is not one of `allowed`.
    pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
        if allowed.contains(&value) {
            return Ok(());
        }
        Err(ValidationError::new(
            field,
            format!("Must be one of: {}", allowed.join(", ")),
        ))
    }
}
