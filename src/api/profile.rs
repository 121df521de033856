//! Profile API endpoints
//!
//! - GET /api/v1/profile/{username}?page= - A user and their posts
//! - PUT /api/v1/profile - Edit own profile (authenticated)

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::responses::{PageQuery, ProfileResponse, UserResponse};
use crate::models::{Page, PostView, UpdateProfileInput};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/profile/{username}", get(get_profile))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/profile", put(update_profile))
}

#[derive(Debug, Serialize)]
pub struct ProfilePostsResponse {
    pub profile: ProfileResponse,
    pub posts: Page<PostView>,
}

/// GET /api/v1/profile/{username}
///
/// The owner also sees drafts and scheduled posts.
async fn get_profile(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(username): Path<String>,
    query: PageQuery,
) -> Result<Json<ProfilePostsResponse>, ApiError> {
    let (profile, posts) = state
        .post_service
        .list_by_profile(&username, user.actor(), query.request())
        .await?;

    Ok(Json(ProfilePostsResponse {
        profile: profile.into(),
        posts,
    }))
}

/// PUT /api/v1/profile
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProfileInput>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.user_service.update_profile(&user.0, body).await?;
    Ok(Json(updated.into()))
}
