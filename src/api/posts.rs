//! Post API endpoints
//!
//! - GET /api/v1/posts?page= - Home listing
//! - GET /api/v1/posts/{id} - Post with comments
//! - POST /api/v1/posts - Create (authenticated)
//! - PUT /api/v1/posts/{id} - Edit own post (authenticated)
//! - DELETE /api/v1/posts/{id} - Delete own post (authenticated)
//!
//! Editing or deleting someone else's post answers `303 See Other` pointing
//! at the post page.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::responses::PageQuery;
use crate::models::{Page, PostInput, PostView};
use crate::services::PostDetail;

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/{id}", axum::routing::put(update_post).delete(delete_post))
}

/// GET /api/v1/posts - Publicly visible posts, newest first
async fn list_posts(
    State(state): State<AppState>,
    user: MaybeUser,
    query: PageQuery,
) -> Result<Json<Page<PostView>>, ApiError> {
    let page = state.post_service.list_index(user.actor(), query.request()).await?;
    Ok(Json(page))
}

/// GET /api/v1/posts/{id}
///
/// Hidden posts are reported as missing.
async fn get_post(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let detail = state.post_service.get_detail(id, user.actor()).await?;
    Ok(Json(detail))
}

/// POST /api/v1/posts
///
/// Answers 201 with the post and a `Location` pointing at the author's
/// profile page.
async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state.post_service.create(&user.0, body).await?;

    let location = format!("/profile/{}/", urlencoding::encode(&user.0.username));
    let location = HeaderValue::from_str(&location)
        .map_err(|e| ApiError::internal_error(format!("Invalid location header: {}", e)))?;

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(post)))
}

/// PUT /api/v1/posts/{id}
async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<PostInput>,
) -> Result<Json<PostView>, ApiError> {
    let post = state.post_service.update(id, user.actor(), body).await?;
    Ok(Json(post))
}

/// DELETE /api/v1/posts/{id}
async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(id, user.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
