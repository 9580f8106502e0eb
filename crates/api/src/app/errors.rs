use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use depthstudio_auth::{AuthError, DirectoryError};
use depthstudio_core::DomainError;

/// Status used for users who still have to pick a role.
pub const ROLE_UNASSIGNED_STATUS: StatusCode = StatusCode::PRECONDITION_REQUIRED;

pub fn auth_error_to_response(err: &AuthError) -> axum::response::Response {
    match err {
        AuthError::Unauthenticated(msg) => {
            let mut response = json_error(StatusCode::UNAUTHORIZED, err.code(), msg.clone());
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            response
        }
        AuthError::RoleUnassigned => json_error(ROLE_UNASSIGNED_STATUS, err.code(), err.to_string()),
        AuthError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, err.code(), msg.clone()),
        AuthError::ProviderUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, err.code(), msg.clone())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        DomainError::Unauthorized => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "not allowed to make this change",
        ),
    }
}

pub fn directory_error_to_response(err: DirectoryError) -> axum::response::Response {
    match err {
        DirectoryError::Domain(e) => domain_error_to_response(e),
        DirectoryError::Unavailable(msg) => {
            tracing::error!("user directory unavailable: {msg}");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "directory_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
