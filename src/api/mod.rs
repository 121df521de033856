//! API layer - HTTP handlers and routing
//!
//! - JSON API under `/api/v1` (posts, comments, profiles, categories,
//!   locations, auth, uploads, administration)
//! - Server-rendered HTML pages
//! - Uploaded media under `/media`

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod locations;
pub mod middleware;
pub mod pages;
pub mod posts;
pub mod profile;
pub mod responses;
pub mod upload;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};

/// Multipart overhead allowed on top of the configured file size
const UPLOAD_BODY_SLACK: usize = 64 * 1024;

/// Build the `/api/v1` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    let upload_limit = usize::try_from(state.upload_config.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(UPLOAD_BODY_SLACK);

    // Admin routes (need admin role)
    let admin_routes = admin::router()
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .merge(posts::protected_router())
        .merge(comments::protected_router())
        .merge(profile::protected_router())
        .merge(upload::router().layer(DefaultBodyLimit::max(upload_limit)))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes, signed-in user optional
    let public_routes = Router::new()
        .merge(auth::public_router())
        .merge(posts::public_router())
        .merge(profile::public_router())
        .merge(categories::router())
        .merge(locations::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::optional_auth,
        ));

    public_routes.merge(protected_routes).merge(admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    let html_routes = pages::router().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::optional_auth,
    ));

    let router = Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .merge(html_routes)
        .nest_service("/media", ServeDir::new(&state.upload_config.path))
        .fallback(pages::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state);

    Ok(router)
}
