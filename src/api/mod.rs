//! LandLedger REST API
//!
//! HTTP API layer for the registry dashboards, built with Axum.
//!
//! # Endpoints
//!
//! ## Properties
//! - `GET /api/v1/properties/:id` - Fetch a property record
//! - `GET /api/v1/owners/:address/properties` - Properties of a wallet
//! - `POST /api/v1/properties` - Register a property
//! - `POST /api/v1/properties/:id/schedule` - Schedule inspection
//! - `POST /api/v1/properties/:id/verify` - Verify
//! - `POST /api/v1/properties/:id/reject` - Reject with reason
//!
//! ## Sales & Bids
//! - `GET /api/v1/sales` - All sales
//! - `GET /api/v1/sales/:id` - One sale
//! - `GET /api/v1/sales/:id/bids` - Ranked bids, highest first
//! - `POST /api/v1/sales` - List a property for sale
//! - `POST /api/v1/sales/:id/cancel` - Cancel a sale
//! - `POST /api/v1/sales/:id/requests` - Submit a bid
//! - `POST /api/v1/requests/:id/cancel` - Withdraw a bid
//! - `POST /api/v1/requests/:id/accept` - Accept a bid
//!
//! ## Roles
//! - `GET /api/v1/roles/:address` - Derived authorization flags
//! - `POST /api/v1/admin/inspectors` - Assign an inspector
//! - `POST /api/v1/admin/employees` - Assign an employee
//!
//! ## Users
//! - `POST /api/v1/users` - Mask, pin and register a profile
//! - `GET /api/v1/users/:address` - Resolve a profile document
//!
//! ## Chat
//! - `GET /api/v1/chat/:a/:b` - Reconciled conversation
//! - `POST /api/v1/chat` - Send a message
//! - `POST /api/v1/chat/:a/:b/read` - Mark read
//! - `GET /api/v1/inbox/:address` - Inbox previews
//! - `GET /api/v1/chat/status` - Sync status flag
//! - `POST /api/v1/chat/backup` - Trigger a cloud backup
//!
//! ## Pinning proxy
//! - `POST /api/v1/pin/json`, `POST /api/v1/pin/file?name=...`
//! - `GET /api/v1/pin/:cid`, `DELETE /api/v1/pin/:cid`
//!
//! ## Geocoding
//! - `GET /api/v1/geocode?q=...`
//!
//! ## Health
//! - `GET /health/live`, `GET /health/ready`, `GET /health`
//!
//! ## WebSocket
//! - `GET /ws` - Live chat delivery

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Property routes
        .route("/properties", post(routes::properties::register_property))
        .route("/properties/:id", get(routes::properties::get_property))
        .route(
            "/properties/:id/schedule",
            post(routes::properties::schedule_inspection),
        )
        .route(
            "/properties/:id/verify",
            post(routes::properties::verify_property),
        )
        .route(
            "/properties/:id/reject",
            post(routes::properties::reject_property),
        )
        .route(
            "/owners/:address/properties",
            get(routes::properties::list_owner_properties),
        )
        // Sale & bid routes
        .route("/sales", get(routes::sales::list_sales))
        .route("/sales", post(routes::sales::create_sale))
        .route("/sales/:id", get(routes::sales::get_sale))
        .route("/sales/:id/bids", get(routes::sales::get_ranked_bids))
        .route("/sales/:id/cancel", post(routes::sales::cancel_sale))
        .route("/sales/:id/requests", post(routes::sales::submit_bid))
        .route("/requests/:id/cancel", post(routes::sales::cancel_request))
        .route("/requests/:id/accept", post(routes::sales::accept_request))
        // Role routes
        .route("/roles/:address", get(routes::roles::get_roles))
        .route("/admin/inspectors", post(routes::roles::assign_inspector))
        .route("/admin/employees", post(routes::roles::assign_employee))
        // User routes
        .route("/users", post(routes::users::register_profile))
        .route("/users/:address", get(routes::users::get_profile))
        // Chat routes
        .route("/chat", post(routes::chat::send_message))
        .route("/chat/status", get(routes::chat::get_status))
        .route("/chat/backup", post(routes::chat::trigger_backup))
        .route("/chat/:a/:b", get(routes::chat::get_conversation))
        .route("/chat/:a/:b/read", post(routes::chat::mark_read))
        .route("/inbox/:address", get(routes::chat::get_inbox))
        // Pinning proxy routes
        .route("/pin/json", post(routes::pinning::pin_json))
        .route("/pin/file", post(routes::pinning::pin_file))
        .route("/pin/:cid", get(routes::pinning::fetch_pinned))
        .route("/pin/:cid", delete(routes::pinning::unpin))
        // Geocode proxy
        .route("/geocode", get(routes::geocode::search))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Internal(format!("Bind failed: {e}")))?;

    tracing::info!("LandLedger API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("LandLedger API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainClient, ChainConfig, LandRegistry, Marketplace, UserRegistry};
    use crate::chat::{ChatStore, ChatSyncConfig, ChatSyncManager};
    use crate::geocode::{GeocodeClient, GeocodeConfig};
    use crate::pinning::{GatewayClient, GatewayConfig};
    use crate::websocket::{ConnectionHub, HubConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Instant;
    use tower::util::ServiceExt;

    // A deployed-contract address from a local dev chain; never dialed in
    // these tests, requests stop at validation or the local store.
    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const ADMIN: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    async fn create_test_app() -> Router {
        let chain_config = ChainConfig {
            registry_address: CONTRACT.to_string(),
            market_address: CONTRACT.to_string(),
            users_address: CONTRACT.to_string(),
            admin_address: ADMIN.to_string(),
            ..Default::default()
        };

        let chain = Arc::new(ChainClient::connect(&chain_config).await.unwrap());
        let registry =
            Arc::new(LandRegistry::new(Arc::clone(&chain), &chain_config.registry_address).unwrap());
        let market =
            Arc::new(Marketplace::new(Arc::clone(&chain), &chain_config.market_address).unwrap());
        let users =
            Arc::new(UserRegistry::new(Arc::clone(&chain), &chain_config.users_address).unwrap());

        let store = Arc::new(ChatStore::in_memory().unwrap());
        let chat = Arc::new(ChatSyncManager::new(
            store,
            None,
            None,
            None,
            ChatSyncConfig::default(),
        ));

        let state = AppState {
            chain,
            registry,
            market,
            users,
            pinning: None,
            gateway: Arc::new(GatewayClient::new(GatewayConfig::default()).unwrap()),
            geocode: Arc::new(GeocodeClient::new(GeocodeConfig::default()).unwrap()),
            chat,
            ws_hub: Arc::new(ConnectionHub::new(HubConfig::default())),
            config: Arc::new(ApiConfig::default()),
            start_time: Instant::now(),
        };

        build_router(state)
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_roles_rejects_bad_address() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/roles/not-an-address")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_send_and_fetch() {
        let app = create_test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/chat")
                    .header("Content-Type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"from": "{ADMIN}", "to": "{CONTRACT}", "content": "hello"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/chat/{ADMIN}/{CONTRACT}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_content() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/chat")
                    .header("Content-Type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"from": "{ADMIN}", "to": "{CONTRACT}", "content": "  "}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_self_message() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/chat")
                    .header("Content-Type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"from": "{ADMIN}", "to": "{ADMIN}", "content": "hi me"}}"#
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_inbox_empty_for_new_user() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/inbox/{ADMIN}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_status_reports_connecting() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/chat/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "connecting");
    }

    #[tokio::test]
    async fn test_pin_proxy_unavailable_without_credential() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pin/json")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"name": "test", "content": {"k": "v"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_sale_bid_rejects_zero_price() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/sales/1/requests")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"price": "0"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_geocode_rejects_empty_query() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/geocode?q=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_profile_rejects_invalid_pan() {
        let app = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/users")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"name": "Asha", "pan": "nope", "aadhaar": "123412341234", "mobile": "9876543210"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
