//! Location API endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::Location;

pub fn router() -> Router<AppState> {
    Router::new().route("/locations", get(list_locations))
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
}

/// GET /api/v1/locations - Published locations
async fn list_locations(State(state): State<AppState>) -> Result<Json<LocationsResponse>, ApiError> {
    let locations = state.location_service.list_published().await?;
    Ok(Json(LocationsResponse { locations }))
}
