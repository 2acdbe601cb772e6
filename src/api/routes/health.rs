//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (node reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 when the RPC node answers; the service is useless without it.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.chain.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Full health status with component details. The pinning service being
/// down degrades but does not fail the service.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let chain_ok = state.chain.ping().await.is_ok();

    let pinning_status = match &state.pinning {
        Some(client) => match client.test_authentication().await {
            Ok(_) => "ok",
            Err(_) => "error",
        },
        None => "disabled",
    };

    let chat_state = state.chat.state().await;

    let overall = if chain_ok && pinning_status != "error" {
        "healthy"
    } else if chain_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: overall.to_string(),
        chain: if chain_ok { "ok" } else { "error" }.to_string(),
        pinning: pinning_status.to_string(),
        chat: chat_state.status,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
