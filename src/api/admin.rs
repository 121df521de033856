//! Admin API endpoints
//!
//! Everything here sits behind `require_admin`:
//! - Category and location management
//! - Removing any post or comment
//! - Reloading the template override directory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    Category, CreateCategoryInput, CreateLocationInput, Location, Post, UpdateCategoryInput, UpdateLocationInput,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/categories", get(list_categories).post(create_category))
        .route(
            "/admin/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/admin/locations", get(list_locations).post(create_location))
        .route(
            "/admin/locations/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/admin/posts/{id}", delete(delete_post))
        .route("/admin/comments/{id}", delete(delete_comment))
        .route("/admin/templates/reload", post(reload_templates))
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct LocationListResponse {
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesReloadResponse {
    pub reloaded: bool,
}

// ============================================================================
// Categories
// ============================================================================

async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.category_service.list_all().await?;
    Ok(Json(CategoryListResponse { categories }))
}

async fn get_category(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.category_service.get_by_id(id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.category_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.category_service.update(id, body).await?))
}

async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Locations
// ============================================================================

async fn list_locations(State(state): State<AppState>) -> Result<Json<LocationListResponse>, ApiError> {
    let locations = state.location_service.list_all().await?;
    Ok(Json(LocationListResponse { locations }))
}

async fn get_location(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.location_service.get_by_id(id).await?))
}

async fn create_location(
    State(state): State<AppState>,
    Json(body): Json<CreateLocationInput>,
) -> Result<impl IntoResponse, ApiError> {
    let location = state.location_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateLocationInput>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.location_service.update(id, body).await?))
}

async fn delete_location(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    state.location_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Moderation
// ============================================================================

/// DELETE /api/v1/admin/posts/{id} - Remove any post; returns what was removed
async fn delete_post(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_service.admin_delete(id).await?;
    tracing::info!("Post {} removed by {}", id, admin.0.username);
    Ok(Json(post))
}

/// DELETE /api/v1/admin/comments/{id}
async fn delete_comment(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.admin_delete(id).await?;
    tracing::info!("Comment {} removed by {}", id, admin.0.username);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/templates/reload - Re-read the template override directory
async fn reload_templates(State(state): State<AppState>) -> Result<Json<TemplatesReloadResponse>, ApiError> {
    let mut engine = state
        .theme_engine
        .write()
        .map_err(|_| ApiError::internal_error("Template engine lock poisoned"))?;
    engine
        .reload()
        .map_err(|e| ApiError::internal_error(format!("Failed to reload templates: {:#}", e)))?;
    Ok(Json(TemplatesReloadResponse { reloaded: true }))
}
