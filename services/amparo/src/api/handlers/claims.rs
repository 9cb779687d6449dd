//! Claim intake and review endpoints.

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::claims::{ClaimWorkflow, NewClaimRequest, ClaimStatus, TransitionRequest};

use super::{claim_error_response, error_body, require_bearer};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClaimListParams {
    /// Optional status filter (e.g. `PENDING`).
    pub status: Option<String>,
}

/// Target status plus the fields the transition requires.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: String,
    #[serde(default)]
    pub review_comments: Option<String>,
    #[serde(default)]
    pub approved_amount_cents: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/claims",
    request_body = NewClaimRequest,
    responses (
        (status = 201, description = "Claim submitted", body = crate::claims::Claim),
        (status = 400, description = "Validation failed", body = super::ErrorBody),
        (status = 401, description = "Missing or invalid token", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all)]
pub async fn submit(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
    payload: Option<Json<NewClaimRequest>>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };
    let Some(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "missing payload");
    };

    match workflow.submit(&bearer, request).await {
        Ok(claim) => (StatusCode::CREATED, Json(claim)).into_response(),
        Err(err) => claim_error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/claims/mine",
    responses (
        (status = 200, description = "The caller's claims, newest first", body = [crate::claims::Claim]),
        (status = 401, description = "Missing or invalid token", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all)]
pub async fn list_mine(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };

    match workflow.list_mine(&bearer).await {
        Ok(claims) => (StatusCode::OK, Json(claims)).into_response(),
        Err(err) => claim_error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/claims",
    params(ClaimListParams),
    responses (
        (status = 200, description = "All claims, optionally filtered by status", body = [crate::claims::Claim]),
        (status = 400, description = "Unknown status filter", body = super::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all)]
pub async fn list_all(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
    Query(params): Query<ClaimListParams>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };
    let status = match params.status.as_deref() {
        None => None,
        Some(raw) => match ClaimStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return error_body(StatusCode::BAD_REQUEST, format!("unknown status: {raw}"));
            }
        },
    };

    match workflow.list_all(&bearer, status).await {
        Ok(claims) => (StatusCode::OK, Json(claims)).into_response(),
        Err(err) => claim_error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/claims/stats",
    responses (
        (status = 200, description = "Per-status claim counts", body = crate::claims::ClaimStatistics),
        (status = 403, description = "Caller is not an admin", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all)]
pub async fn statistics(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };

    match workflow.statistics(&bearer).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => claim_error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/claims/{id}",
    params(("id" = Uuid, Path, description = "Claim id")),
    responses (
        (status = 200, description = "The claim", body = crate::claims::Claim),
        (status = 403, description = "Caller is neither the owner nor an admin", body = super::ErrorBody),
        (status = 404, description = "No such claim", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all, fields(claim_id = %id))]
pub async fn get(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
    Path(id): Path<Uuid>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };

    match workflow.get(&bearer, id).await {
        Ok(claim) => (StatusCode::OK, Json(claim)).into_response(),
        Err(err) => claim_error_response(err),
    }
}

#[utoipa::path(
    put,
    path = "/claims/{id}/status",
    request_body = StatusUpdateRequest,
    params(("id" = Uuid, Path, description = "Claim id")),
    responses (
        (status = 200, description = "Claim transitioned", body = crate::claims::Claim),
        (status = 400, description = "Unknown status or missing transition fields", body = super::ErrorBody),
        (status = 403, description = "Caller is not an admin", body = super::ErrorBody),
        (status = 404, description = "No such claim", body = super::ErrorBody),
        (status = 409, description = "Illegal transition", body = super::ErrorBody),
    ),
    tag = "claims"
)]
#[instrument(skip_all, fields(claim_id = %id))]
pub async fn transition(
    headers: HeaderMap,
    workflow: Extension<Arc<ClaimWorkflow>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<StatusUpdateRequest>>,
) -> Response {
    let bearer = match require_bearer(&headers) {
        Ok(bearer) => bearer,
        Err(response) => return response,
    };
    let Some(Json(request)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, "missing payload");
    };
    let Some(target) = ClaimStatus::parse(&request.status) else {
        return error_body(
            StatusCode::BAD_REQUEST,
            format!("unknown status: {}", request.status),
        );
    };

    let fields = TransitionRequest {
        review_comments: request.review_comments,
        approved_amount_cents: request.approved_amount_cents,
    };
    match workflow.transition(&bearer, id, target, &fields).await {
        Ok(claim) => (StatusCode::OK, Json(claim)).into_response(),
        Err(err) => claim_error_response(err),
    }
}
