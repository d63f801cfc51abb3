use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ValidationViolation};
use crate::domain::error::DomainError;

pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
pub const MALFORMED_BODY: &str = "MALFORMED_BODY";
pub const INVALID_PARAMETER_VALUE: &str = "INVALID_PARAMETER_VALUE";
pub const INVALID_FILTER: &str = "INVALID_FILTER";
pub const ENTITY_NOT_FOUND: &str = "ENTITY_NOT_FOUND";
pub const DUPLICATE_ID: &str = "DUPLICATE_ID";
pub const ADDRESS_NOT_FOUND: &str = "ADDRESS_NOT_FOUND";
pub const GEOCODER_UNAVAILABLE: &str = "GEOCODER_UNAVAILABLE";
pub const GEOCODER_ERROR: &str = "GEOCODER_ERROR";
pub const INTERNAL: &str = "INTERNAL";

/// Map domain error to RFC9457 Problem
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let problem = match e {
        DomainError::NotFound { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", e.to_string()).with_code(ENTITY_NOT_FOUND)
        }
        DomainError::DuplicateId { .. } => {
            Problem::new(StatusCode::CONFLICT, "Conflict", e.to_string()).with_code(DUPLICATE_ID)
        }
        DomainError::Validation { field, message } => validation_problem(vec![
            ValidationViolation::new(field.clone(), message.clone()),
        ]),
        DomainError::InvalidFilter { message } => invalid_filter_problem("filter", message),
        DomainError::AddressNotFound { .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Bad Request", e.to_string())
                .with_code(ADDRESS_NOT_FOUND)
        }
        DomainError::GeocoderUnavailable { .. } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Bad Gateway", e.to_string())
                .with_code(GEOCODER_UNAVAILABLE)
        }
        DomainError::Geocoder { .. } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Bad Gateway", e.to_string())
                .with_code(GEOCODER_ERROR)
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, "Database error occurred");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An internal database error occurred",
            )
            .with_code(INTERNAL)
        }
    };
    problem.with_instance(instance)
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}

/// 422 carrying every violation found in a request body.
pub fn validation_problem(violations: Vec<ValidationViolation>) -> Problem {
    Problem::new(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Unprocessable Entity",
        "The request body is invalid. See error object `errors` property for more details.",
    )
    .with_code(VALIDATION_FAILED)
    .with_errors(violations)
}

pub fn malformed_body_problem(detail: impl Into<String>) -> Problem {
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail).with_code(MALFORMED_BODY)
}

/// 400 for a key rejected by the key guard.
pub fn prohibited_key_problem(param: &str, key: &str) -> Problem {
    let detail = format!("JSON string cannot contain \"{key}\" key.");
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", detail.clone())
        .with_code(INVALID_PARAMETER_VALUE)
        .with_errors(vec![
            ValidationViolation::new(param, detail).with_code("PROHIBITED_KEY"),
        ])
}

pub fn invalid_filter_problem(param: &str, message: impl Into<String>) -> Problem {
    let message = message.into();
    Problem::new(
        StatusCode::BAD_REQUEST,
        "Bad Request",
        format!("Invalid `{param}` parameter: {message}"),
    )
    .with_code(INVALID_FILTER)
    .with_errors(vec![ValidationViolation::new(param, message)])
}
