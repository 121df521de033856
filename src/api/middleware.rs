//! API middleware
//!
//! Contains middleware for:
//! - Authentication (session token validation)
//! - Authorization (admin checks)
//!
//! and the extractors handlers use to read the signed-in user.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::cache::Cache;
use crate::config::UploadConfig;
use crate::db::repositories::{
    SqlxCategoryRepository, SqlxCommentRepository, SqlxLocationRepository, SqlxPostRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::policy::{Actor, Clock};
use crate::services::{CategoryService, CommentService, LocationService, PostService, UserService};
use crate::theme::ThemeEngine;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub category_service: Arc<CategoryService>,
    pub location_service: Arc<LocationService>,
    pub theme_engine: Arc<RwLock<ThemeEngine>>,
    pub upload_config: Arc<UploadConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire repositories and services over one pool and cache
    pub fn new(
        pool: DynDatabasePool,
        cache: Arc<Cache>,
        cache_ttl: Duration,
        theme_engine: ThemeEngine,
        upload_config: UploadConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let category_repo = SqlxCategoryRepository::boxed(pool.clone());
        let location_repo = SqlxLocationRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool);

        let user_service = Arc::new(UserService::new(user_repo.clone(), session_repo, clock.clone()));
        let category_service = Arc::new(CategoryService::new(category_repo.clone(), cache, cache_ttl));
        let location_service = Arc::new(LocationService::new(location_repo.clone()));
        let comment_service = Arc::new(CommentService::new(
            comment_repo.clone(),
            post_repo.clone(),
            clock.clone(),
        ));
        let post_service = Arc::new(PostService::new(
            post_repo,
            comment_repo,
            user_repo,
            category_repo,
            location_repo,
            category_service.clone(),
            clock.clone(),
        ));

        Self {
            user_service,
            post_service,
            comment_service,
            category_service,
            location_service,
            theme_engine: Arc::new(RwLock::new(theme_engine)),
            upload_config: Arc::new(upload_config),
            clock,
        }
    }
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn actor(&self) -> Actor {
        Actor::User(self.0.id)
    }
}

/// The signed-in user on routes where signing in is optional
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn actor(&self) -> Actor {
        Actor::from_user(self.0.as_ref())
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
    /// Set for denied mutations: the response is a redirect, not JSON
    #[serde(skip)]
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            redirect_to: None,
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        let mut error = Self::new(code, message);
        error.error.details = Some(details);
        error
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// A denied edit or delete: send the caller back to the post page
    pub fn redirect_to_post(post_id: i64) -> Self {
        let mut error = Self::new("PERMISSION_DENIED", "You cannot change this content");
        error.redirect_to = Some(format!("/posts/{}/", post_id));
        error
    }

    pub fn status(&self) -> StatusCode {
        if self.redirect_to.is_some() {
            return StatusCode::SEE_OTHER;
        }
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(location) = &self.redirect_to {
            return Redirect::to(location).into_response();
        }
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.error.message);
        }
        (status, Json(self)).into_response()
    }
}

/// Extract session token from request
fn extract_session_token(request: &Request) -> Option<String> {
    session_token_from_parts(request.headers())
}

/// Bearer token first, then the `session` cookie
pub(crate) fn session_token_from_parts(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication middleware
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(&request) {
        match state.user_service.validate_session(&token).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(AuthenticatedUser(user));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session validation failed: {}", e),
        }
    }
    next.run(request).await
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts.extensions.get::<AuthenticatedUser>().map(|u| u.0.clone()),
        ))
    }
}
