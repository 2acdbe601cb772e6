//! Pinning Proxy Routes
//!
//! Thin JSON re-exposure of the pinning service for the dashboards, so
//! the browser never holds the credential.
//!
//! - POST   /api/v1/pin/json
//! - POST   /api/v1/pin/file?name=... - raw body upload
//! - GET    /api/v1/pin/:cid - resolve through the gateway
//! - DELETE /api/v1/pin/:cid

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::dto::{PinJsonRequest, PinResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Document uploads are bounded; registry scans are small PDFs/images
const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct PinFileQuery {
    pub name: String,
}

/// POST /api/v1/pin/json
pub async fn pin_json(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PinJsonRequest>,
) -> ApiResult<(StatusCode, Json<PinResponse>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Pin name must not be empty".to_string()));
    }

    let pinning = state.pinning_client()?;
    let cid = pinning.pin_json(req.name.trim(), &req.content).await?;

    Ok((StatusCode::CREATED, Json(PinResponse { cid })))
}

/// POST /api/v1/pin/file?name=...
///
/// Raw request body is the file content; used for property documents.
pub async fn pin_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PinFileQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PinResponse>)> {
    if query.name.trim().is_empty() {
        return Err(ApiError::Validation("Pin name must not be empty".to_string()));
    }
    if body.is_empty() {
        return Err(ApiError::Validation("File body must not be empty".to_string()));
    }
    if body.len() > MAX_FILE_BYTES {
        return Err(ApiError::Validation(format!(
            "File exceeds {MAX_FILE_BYTES} bytes"
        )));
    }

    let pinning = state.pinning_client()?;
    let cid = pinning.pin_file(query.name.trim(), body.to_vec()).await?;

    Ok((StatusCode::CREATED, Json(PinResponse { cid })))
}

/// GET /api/v1/pin/:cid
pub async fn fetch_pinned(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if cid.trim().is_empty() {
        return Err(ApiError::Validation("CID must not be empty".to_string()));
    }

    let document = state.gateway.fetch_json(cid.trim()).await?;
    Ok(Json(document))
}

/// DELETE /api/v1/pin/:cid
pub async fn unpin(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
) -> ApiResult<StatusCode> {
    let pinning = state.pinning_client()?;
    pinning.unpin(cid.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}
