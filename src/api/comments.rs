//! Comment API endpoints
//!
//! Comments live under their post:
//! - POST /api/v1/posts/{id}/comments
//! - PUT /api/v1/posts/{id}/comments/{comment_id}
//! - DELETE /api/v1/posts/{id}/comments/{comment_id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, CommentInput};

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/comments", post(add_comment))
        .route(
            "/posts/{id}/comments/{comment_id}",
            put(edit_comment).delete(delete_comment),
        )
}

async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(body): Json<CommentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state.comment_service.add(post_id, &user.0, &body.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn edit_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(body): Json<CommentInput>,
) -> Result<Json<Comment>, ApiError> {
    let comment = state
        .comment_service
        .edit(post_id, comment_id, user.actor(), &body.text)
        .await?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .comment_service
        .delete(post_id, comment_id, user.actor())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
