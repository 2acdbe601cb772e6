//! Geocode Proxy Route
//!
//! - GET /api/v1/geocode?q=... - forward geocoding for map pins

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::geocode::GeocodeResult;

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub q: String,
}

/// GET /api/v1/geocode
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GeocodeQuery>,
) -> ApiResult<Json<Vec<GeocodeResult>>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::Validation("Query must not be empty".to_string()));
    }

    let results = state.geocode.search(query.q.trim()).await?;
    Ok(Json(results))
}
