//! Sale & Bid Routes
//!
//! Marketplace listings and purchase requests, including the ranked-bid
//! view sellers use to pick a buyer.
//!
//! - GET  /api/v1/sales
//! - GET  /api/v1/sales/:id
//! - GET  /api/v1/sales/:id/bids - ranked, highest first
//! - POST /api/v1/sales - list a property
//! - POST /api/v1/sales/:id/cancel
//! - POST /api/v1/sales/:id/requests - submit a bid
//! - POST /api/v1/requests/:id/cancel
//! - POST /api/v1/requests/:id/accept

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateSaleRequest, RankedBidDto, SaleDto, SubmitBidRequest};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::bids::rank_bids;
use crate::chain::TxOutcome;

use super::parse_amount;

/// GET /api/v1/sales
pub async fn list_sales(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SaleDto>>> {
    let sales = state.market.all_sales().await?;
    Ok(Json(sales.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/sales/:id
pub async fn get_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<SaleDto>> {
    let sale = state.market.get_sale(id).await?;
    Ok(Json(sale.into()))
}

/// GET /api/v1/sales/:id/bids
///
/// Per buyer, the latest still-standing offer, ranked by price
/// descending; the first entry carries the `highest` flag.
pub async fn get_ranked_bids(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<RankedBidDto>>> {
    let requests = state.market.requests_for_sale(id).await?;
    let ranked = rank_bids(&requests);
    Ok(Json(ranked.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/sales
pub async fn create_sale(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<TxOutcome>)> {
    let price = parse_amount(&req.price)?;
    let outcome = state.market.put_on_sale(req.property_id, price).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/sales/:id/cancel
pub async fn cancel_sale(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<TxOutcome>> {
    Ok(Json(state.market.cancel_sale(id).await?))
}

/// POST /api/v1/sales/:id/requests
pub async fn submit_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<SubmitBidRequest>,
) -> ApiResult<(StatusCode, Json<TxOutcome>)> {
    let price = parse_amount(&req.price)?;
    let outcome = state.market.submit_request(id, price).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/requests/:id/cancel
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<TxOutcome>> {
    Ok(Json(state.market.cancel_request(id).await?))
}

/// POST /api/v1/requests/:id/accept
pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<TxOutcome>> {
    Ok(Json(state.market.accept_request(id).await?))
}
