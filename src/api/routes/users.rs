//! User Routes
//!
//! Profile registration and lookup: mask the identity fields, pin the
//! document, record the CID on-chain, and resolve it back through the
//! gateway on reads.
//!
//! - POST /api/v1/users - register the signer's profile
//! - GET  /api/v1/users/:address

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::api::dto::RegisterProfileResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::profile::{ProfileDocument, ProfileInput};

use super::parse_addr;

/// POST /api/v1/users
///
/// Validate → mask → pin → register CID. The full PAN/Aadhaar never
/// leave this handler.
pub async fn register_profile(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ProfileInput>,
) -> ApiResult<(StatusCode, Json<RegisterProfileResponse>)> {
    let document = input
        .into_document()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let pinning = state.pinning_client()?;

    let name = format!("landledger-profile-{}", document.name.to_lowercase().replace(' ', "-"));
    let cid = pinning.replace_json(&name, &json!(document)).await?;

    let outcome = state.users.register_profile(&cid).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterProfileResponse {
            cid,
            tx_hash: outcome.tx_hash,
        }),
    ))
}

/// GET /api/v1/users/:address
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<ProfileDocument>> {
    let account = parse_addr(&address)?;

    let cid = state.users.profile_cid(account).await?;
    if cid.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No profile registered for {address}"
        )));
    }

    let document = state.gateway.fetch_json(&cid).await?;
    let profile: ProfileDocument = serde_json::from_value(document)
        .map_err(|e| ApiError::Internal(format!("Malformed profile document: {e}")))?;

    Ok(Json(profile))
}
