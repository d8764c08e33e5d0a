use axum::http::StatusCode;
use schema_validator::ValidationErrors;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::config::UsersConfig;
use crate::domain::error::DomainError;

/// Transport mapping choices that are configurable per deployment.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPolicy {
    /// Status for `UserNotFound`.
    pub not_found: StatusCode,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            not_found: StatusCode::NOT_FOUND,
        }
    }
}

impl ErrorPolicy {
    pub fn from_config(cfg: &UsersConfig) -> anyhow::Result<Self> {
        let not_found = StatusCode::from_u16(cfg.not_found_status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "users.not_found_status must be a 4xx or 5xx status, got {}",
                    cfg.not_found_status
                )
            })?;
        Ok(Self { not_found })
    }
}

/// Helper to create a Problem with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> Problem {
    Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance)
}

/// Map schema violations to a 400 problem carrying every `{fieldPath, message}`.
pub fn map_validation_errors(errors: ValidationErrors, instance: &str) -> ProblemResponse {
    tracing::debug!(violations = ?errors.paths(), "Request rejected by schema");
    let problem = from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_VALIDATION",
        "Validation error",
        errors.to_string(),
        instance,
    )
    .with_errors(errors.into_details());
    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, policy: ErrorPolicy, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::UserNotFound { id } => from_parts(
            policy.not_found,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id '{}' was not found", id),
            instance,
        ),
        DomainError::Internal { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "USERS_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    };
    ProblemResponse(problem)
}
