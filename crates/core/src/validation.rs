//! Required-field validation for resource forms
//!
//! The backend owns every real invariant. These checks only stop obviously
//! incomplete submissions before a request is sent.

use std::fmt::{self, Display};

use crate::types::{Currency, CurrencyUpdate, NewUser, RoleInput, UserUpdate};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// All rejected fields of one form, in field order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Message of the first rejected field, as a form would show it
    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    /// Fold a check result into the collection
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    /// `Ok` when nothing was rejected
    ///
    /// # Errors
    ///
    /// Returns `self` if any field was rejected
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Forms that can be checked before submission
pub trait Validate {
    /// # Errors
    ///
    /// Returns every rejected field
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Common validation helpers
pub mod validators {
    use super::ValidationError;

    /// Reject blank values; `label` is the human field name
    pub fn validate_required(
        value: &str,
        field: &'static str,
        label: &str,
    ) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError {
                field,
                message: format!("{label} is required"),
            });
        }
        Ok(())
    }

    /// Reject currency codes that are not plain letters and digits
    pub fn validate_currency_code(code: &str, field: &'static str) -> Result<(), ValidationError> {
        validate_required(code, field, "Currency code")?;
        if crate::types::Currency::normalize_code(code).is_none() {
            return Err(ValidationError {
                field,
                message: "Currency code may only contain letters and digits".to_string(),
            });
        }
        Ok(())
    }

    /// Validate email format (basic check)
    pub fn validate_email(email: &str, field: &'static str) -> Result<(), ValidationError> {
        let email = email.trim();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            });
        if !valid {
            return Err(ValidationError {
                field,
                message: "Email address is invalid".to_string(),
            });
        }
        Ok(())
    }
}

use validators::{validate_currency_code, validate_email, validate_required};

impl Validate for RoleInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(validate_required(&self.name, "name", "Role name"));
        errors.into_result()
    }
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(validate_required(&self.name, "name", "Name"));
        if self.email.trim().is_empty() {
            errors.check(validate_required(&self.email, "email", "Email"));
        } else {
            errors.check(validate_email(&self.email, "email"));
        }
        errors.check(validate_required(&self.password, "password", "Password"));
        errors.into_result()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(name) = &self.name {
            errors.check(validate_required(name, "name", "Name"));
        }
        if let Some(email) = &self.email {
            errors.check(validate_email(email, "email"));
        }
        errors.into_result()
    }
}

impl Validate for Currency {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(validate_currency_code(&self.code, "code"));
        errors.check(validate_required(&self.name, "name", "Currency name"));
        errors.check(validate_required(&self.symbol, "symbol", "Currency symbol"));
        errors.into_result()
    }
}

impl Validate for CurrencyUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(validate_required(&self.name, "name", "Currency name"));
        errors.check(validate_required(&self.symbol, "symbol", "Currency symbol"));
        errors.into_result()
    }
}
