//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (bad identifier, unreadable body).
    BadRequest(String),
    /// Missing or invalid bearer token.
    Unauthorized(String),
    /// Error surfaced by the lifecycle engine.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DomainError::IllegalStateTransition(_) | DomainError::ConflictingState(_) => {
            StatusCode::CONFLICT
        }
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => {
            tracing::error!(error = %err, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_protocol_statuses() {
        assert_eq!(
            status_of(DomainError::not_found("x").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::invalid_input("x").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::illegal_transition("x").into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::conflict("x").into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::forbidden("x").into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::storage("x").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn shell_errors_map_to_protocol_statuses() {
        assert_eq!(
            status_of(ApiError::BadRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
    }
}
