//! Property Routes
//!
//! Property records and their lifecycle transition transactions.
//!
//! - GET  /api/v1/properties/:id
//! - GET  /api/v1/owners/:address/properties
//! - POST /api/v1/properties - register
//! - POST /api/v1/properties/:id/schedule - schedule inspection
//! - POST /api/v1/properties/:id/verify - verify
//! - POST /api/v1/properties/:id/reject - reject with reason

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PropertyDto, RegisterPropertyRequest, RejectPropertyRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chain::TxOutcome;

use super::{parse_addr, parse_amount};

/// GET /api/v1/properties/:id
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<PropertyDto>> {
    let property = state.registry.get_property(id).await?;
    Ok(Json(property.into()))
}

/// GET /api/v1/owners/:address/properties
pub async fn list_owner_properties(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<PropertyDto>>> {
    let owner = parse_addr(&address)?;
    let properties = state.registry.properties_of(owner).await?;
    Ok(Json(properties.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/properties
///
/// Register a new property owned by the service signer.
pub async fn register_property(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterPropertyRequest>,
) -> ApiResult<(StatusCode, Json<TxOutcome>)> {
    if req.survey_number.trim().is_empty() {
        return Err(ApiError::Validation("Survey number must not be empty".to_string()));
    }
    if req.area == 0 {
        return Err(ApiError::Validation("Area must be greater than zero".to_string()));
    }
    let market_value = parse_amount(&req.market_value)?;

    let outcome = state
        .registry
        .register_property(
            req.area,
            req.location_id,
            req.revenue_department_id,
            req.survey_number.trim(),
            market_value,
            req.document_cid.trim(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/properties/:id/schedule
pub async fn schedule_inspection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<TxOutcome>> {
    Ok(Json(state.registry.schedule_inspection(id).await?))
}

/// POST /api/v1/properties/:id/verify
pub async fn verify_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<TxOutcome>> {
    Ok(Json(state.registry.verify_property(id).await?))
}

/// POST /api/v1/properties/:id/reject
pub async fn reject_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<RejectPropertyRequest>,
) -> ApiResult<Json<TxOutcome>> {
    if req.reason.trim().is_empty() {
        return Err(ApiError::Validation(
            "Rejection reason must not be empty".to_string(),
        ));
    }

    Ok(Json(
        state.registry.reject_property(id, req.reason.trim()).await?,
    ))
}
