//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "amparo",
        description = "Disaster-relief claims intake and access management"
    ),
    paths(
        handlers::health::health,
        handlers::auth::login,
        handlers::auth::register,
        handlers::users::set_role,
        handlers::claims::submit,
        handlers::claims::list_mine,
        handlers::claims::list_all,
        handlers::claims::statistics,
        handlers::claims::get,
        handlers::claims::transition,
    ),
    components(schemas(
        handlers::ErrorBody,
        handlers::health::Health,
        handlers::auth::LoginRequest,
        handlers::auth::AuthResponse,
        handlers::users::RoleUpdateRequest,
        handlers::claims::StatusUpdateRequest,
        crate::auth::FieldError,
        crate::auth::RegisterRequest,
        crate::auth::Role,
        crate::auth::UserProfile,
        crate::claims::Claim,
        crate::claims::ClaimStatistics,
        crate::claims::ClaimStatus,
        crate::claims::NewClaimRequest,
    ))
)]
pub struct ApiDoc;

/// Render the OpenAPI document as JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn openapi() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}
