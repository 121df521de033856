//! Category API endpoints
//!
//! - GET /api/v1/categories - Published categories
//! - GET /api/v1/categories/{slug}/posts?page= - Posts in a published category

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, MaybeUser};
use crate::api::responses::PageQuery;
use crate::models::{Category, Page, PostView};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/{slug}/posts", get(list_category_posts))
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPostsResponse {
    pub category: Category,
    pub posts: Page<PostView>,
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state.category_service.list_published().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// GET /api/v1/categories/{slug}/posts
///
/// An unpublished category is reported as missing.
async fn list_category_posts(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(slug): Path<String>,
    query: PageQuery,
) -> Result<Json<CategoryPostsResponse>, ApiError> {
    let (category, posts) = state
        .post_service
        .list_by_category(&slug, user.actor(), query.request())
        .await?;
    Ok(Json(CategoryPostsResponse { category, posts }))
}
