//! API handlers and shared utilities.
//!
//! Handlers are thin: extract the bearer token, call into the auth/claims
//! core, and map domain errors onto status codes. No stack traces or
//! internal details cross this boundary; every failure body is a stable
//! error kind plus a human-readable reason.

pub mod auth;
pub mod claims;
pub mod health;
pub mod users;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AuthError, FieldError};
use crate::claims::ClaimError;

/// Stable error body returned for every failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

pub(crate) fn error_body(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            fields: None,
        }),
    )
        .into_response()
}

pub(crate) fn auth_error_response(err: AuthError) -> Response {
    match err {
        AuthError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "validation failed".to_string(),
                fields: Some(fields),
            }),
        )
            .into_response(),
        AuthError::Duplicate(field) => {
            error_body(StatusCode::CONFLICT, format!("{field} already exists"))
        }
        AuthError::AuthenticationFailed => {
            error_body(StatusCode::UNAUTHORIZED, "invalid credentials")
        }
        AuthError::TokenInvalid => error_body(StatusCode::UNAUTHORIZED, "invalid token"),
        AuthError::TokenExpired => error_body(StatusCode::UNAUTHORIZED, "token expired"),
        AuthError::Forbidden => error_body(StatusCode::FORBIDDEN, "insufficient role"),
        AuthError::UnknownUser(username) => {
            error_body(StatusCode::NOT_FOUND, format!("user not found: {username}"))
        }
        AuthError::Store(err) => {
            tracing::error!("store unavailable: {err:?}");
            error_body(StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
        AuthError::Internal(err) => {
            tracing::error!("internal error: {err:?}");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

pub(crate) fn claim_error_response(err: ClaimError) -> Response {
    match err {
        ClaimError::Validation(fields) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "validation failed".to_string(),
                fields: Some(fields),
            }),
        )
            .into_response(),
        ClaimError::IllegalTransition { from, to } => error_body(
            StatusCode::CONFLICT,
            format!("cannot transition claim from {from} to {to}"),
        ),
        ClaimError::NotFound => error_body(StatusCode::NOT_FOUND, "claim not found"),
        ClaimError::Auth(err) => auth_error_response(err),
        ClaimError::Store(err) => {
            tracing::error!("store unavailable: {err:?}");
            error_body(StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Missing credentials read as an unauthorized request, not a bad one.
pub(crate) fn require_bearer(headers: &HeaderMap) -> Result<String, Response> {
    extract_bearer_token(headers)
        .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "missing bearer token"))
}
