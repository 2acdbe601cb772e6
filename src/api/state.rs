//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::chain::{ChainClient, LandRegistry, Marketplace, UserRegistry};
use crate::chat::ChatSyncManager;
use crate::geocode::GeocodeClient;
use crate::pinning::{GatewayClient, PinningClient};
use crate::websocket::ConnectionHub;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Node connection (admin address, reachability probe)
    pub chain: Arc<ChainClient>,
    /// Land-registry contract wrapper
    pub registry: Arc<LandRegistry>,
    /// Marketplace contract wrapper
    pub market: Arc<Marketplace>,
    /// User-registry contract wrapper
    pub users: Arc<UserRegistry>,
    /// Pinning service client; None runs the service local-only
    pub pinning: Option<Arc<PinningClient>>,
    /// IPFS gateway reads
    pub gateway: Arc<GatewayClient>,
    /// Geocoding client
    pub geocode: Arc<GeocodeClient>,
    /// Chat reconciliation and backup
    pub chat: Arc<ChatSyncManager>,
    /// WebSocket connection hub for live chat delivery
    pub ws_hub: Arc<ConnectionHub>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if the pinning service is configured
    pub fn has_pinning(&self) -> bool {
        self.pinning.is_some()
    }

    /// Pinning client, or a service-unavailable error for proxy routes
    pub fn pinning_client(&self) -> Result<&Arc<PinningClient>, super::error::ApiError> {
        self.pinning.as_ref().ok_or_else(|| {
            super::error::ApiError::ServiceUnavailable(
                "Pinning service not configured".to_string(),
            )
        })
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins for the dashboards
    pub cors_origins: Vec<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8086,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
