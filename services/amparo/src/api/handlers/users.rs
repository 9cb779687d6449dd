//! Administrative user management endpoints.

use axum::{
    Json,
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use crate::auth::{Role, RoleAdmin};

use super::{auth_error_response, error_body, require_bearer};

#[derive(ToSchema, Deserialize, Debug)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

#[utoipa::path(
    put,
    path = "/users/{username}/role",
    request_body = RoleUpdateRequest,
    params(("username" = String, Path, description = "Target username")),
    responses (
        (status = 200, description = "Role updated", body = crate::auth::UserProfile),
        (status = 401, description = "Missing or invalid token", body = super::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = super::ErrorBody),
        (status = 404, description = "No such user", body = super::ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(username = %username))]
pub async fn set_role(
    headers: HeaderMap,
    admin: Extension<Arc<RoleAdmin>>,
    Path(username): Path<String>,
    payload: Option<Json<RoleUpdateRequest>>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };
    let Some(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "missing payload");
    };

    match admin.set_role(&bearer, &username, request.role).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => auth_error_response(err),
    }
}
