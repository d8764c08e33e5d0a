use schema_validator::{FieldViolation, ValidationErrors};
use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UsersError {
    #[error("User not found: {id}")]
    NotFound { id: String },

    #[error("Validation error: {} violation(s)", .details.len())]
    Validation { details: Vec<FieldViolation> },

    #[error("Internal error")]
    Internal,
}

impl UsersError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation {
            details: errors.into_details(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            Internal { .. } => Self::internal(),
        }
    }
}

impl From<ValidationErrors> for UsersError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}
