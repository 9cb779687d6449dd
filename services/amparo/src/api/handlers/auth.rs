//! Login and registration endpoints.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::{AuthService, AuthSession, RegisterRequest, Role};

use super::{auth_error_response, error_body};

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token plus public profile, returned by both login and registration.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_at: session.expires_at,
            username: session.profile.username,
            full_name: session.profile.full_name,
            email: session.profile.email,
            role: session.profile.role,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = super::ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "missing payload");
    };

    match service.login(&request.username, &request.password).await {
        Ok(session) => (StatusCode::OK, Json(AuthResponse::from(session))).into_response(),
        Err(err) => auth_error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses (
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Validation failed", body = super::ErrorBody),
        (status = 409, description = "Username or email already exists", body = super::ErrorBody),
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<AuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> Response {
    let Some(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "missing payload");
    };

    match service.register(request).await {
        Ok(session) => (StatusCode::CREATED, Json(AuthResponse::from(session))).into_response(),
        Err(err) => auth_error_response(err),
    }
}
