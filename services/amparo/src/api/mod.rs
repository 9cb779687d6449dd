use crate::{
    auth::{
        AuthService, AuthorizationGate, CredentialHasher, HasherConfig, PgUserStore, RoleAdmin,
        TokenConfig, TokenIssuer,
    },
    claims::{ClaimWorkflow, PgClaimStore},
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Everything the server needs beyond its listen port and DSN.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub frontend_base_url: String,
    pub token: TokenConfig,
    pub hasher: HasherConfig,
}

/// Build the API router with all documented routes registered.
fn router() -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/users/:username/role", put(handlers::users::set_role))
        .route(
            "/claims",
            post(handlers::claims::submit).get(handlers::claims::list_all),
        )
        .route("/claims/mine", get(handlers::claims::list_mine))
        .route("/claims/stats", get(handlers::claims::statistics))
        .route("/claims/:id", get(handlers::claims::get))
        .route("/claims/:id/status", put(handlers::claims::transition))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, config: ServerConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let tokens = Arc::new(TokenIssuer::new(config.token));
    let hasher = Arc::new(CredentialHasher::new(config.hasher)?);
    let users = Arc::new(PgUserStore::new(pool.clone()));
    let claims = Arc::new(PgClaimStore::new(pool.clone()));
    let gate = Arc::new(AuthorizationGate::new(tokens.clone()));

    let auth_service = Arc::new(AuthService::new(users.clone(), hasher, tokens));
    let role_admin = Arc::new(RoleAdmin::new(gate.clone(), users.clone()));
    let workflow = Arc::new(ClaimWorkflow::new(gate, users, claims));

    let frontend_origin = frontend_origin(&config.frontend_base_url)?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = router().layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors)
            .layer(Extension(auth_service))
            .layer(Extension(role_admin))
            .layer(Extension(workflow))
            .layer(Extension(pool)),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_paths_and_keeps_ports() -> Result<()> {
        let origin = frontend_origin("http://localhost:4200/app/")?;
        assert_eq!(origin, HeaderValue::from_static("http://localhost:4200"));

        let origin = frontend_origin("https://relief.example.com")?;
        assert_eq!(origin, HeaderValue::from_static("https://relief.example.com"));
        Ok(())
    }

    #[test]
    fn frontend_origin_rejects_hostless_urls() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("file:///tmp/x").is_err());
    }
}
