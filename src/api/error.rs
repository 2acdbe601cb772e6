//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::chain::ChainError;
use crate::chat::StoreError;
use crate::geocode::GeocodeError;
use crate::pinning::PinningError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Chain client error (RPC, revert, signer)
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Pinning service error
    #[error("Pinning error: {0}")]
    Pinning(#[from] PinningError),

    /// Local chat store error
    #[error("Chat store error: {0}")]
    Store(#[from] StoreError),

    /// Geocoding upstream error
    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Feature disabled by configuration
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Chain(e) => match e {
                ChainError::Revert { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "CONTRACT_REVERT")
                }
                ChainError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
                ChainError::NoSigner => (StatusCode::SERVICE_UNAVAILABLE, "SIGNER_UNAVAILABLE"),
                ChainError::Rpc(_) | ChainError::Dropped { .. } => {
                    (StatusCode::BAD_GATEWAY, "CHAIN_UNAVAILABLE")
                }
                ChainError::Decode(_) | ChainError::Abi(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "CHAIN_DECODE_ERROR")
                }
            },
            ApiError::Pinning(_) => (StatusCode::SERVICE_UNAVAILABLE, "PINNING_UNAVAILABLE"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            ApiError::Geocode(_) => (StatusCode::BAD_GATEWAY, "GEOCODE_UNAVAILABLE"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revert_maps_to_unprocessable() {
        let response = ApiError::Chain(ChainError::Revert {
            reason: "property not verified".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = ApiError::Validation("bad input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pinning_failure_maps_to_service_unavailable() {
        let response = ApiError::Pinning(PinningError::Timeout).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
