//! # LandLedger
//!
//! Off-chain service layer for a blockchain land registry: typed contract
//! access, role derivation, bid ranking, and multi-source chat sync for
//! the registry dashboards.
//!
//! ## Features
//!
//! - **Contract client**: simulate-then-send writes with decoded revert
//!   reasons, receipt tracking, read wrappers for all three contracts
//! - **Role derivation**: admin / inspector / employee / citizen from one
//!   configured admin wallet and two on-chain assignment reads
//! - **Bid ranking**: per-buyer effective offers, highest first
//! - **Chat**: local SQLite cache + pinned cloud snapshots + gossipsub
//!   log, reconciled by dedup-merge with per-source failure isolation
//! - **Proxies**: pinning service, IPFS gateway, geocoding
//!
//! ## Modules
//!
//! - [`chain`]: smart-contract client layer
//! - [`chat`]: multi-store chat with reconciliation
//! - [`pinning`]: pinning-service and gateway clients
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use landledger::chain::{ChainClient, ChainConfig, LandRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChainConfig {
//!         rpc_url: "http://localhost:8545".into(),
//!         registry_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
//!         market_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
//!         users_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
//!         admin_address: "0x52908400098527886E0F7030069857D2E4169EE7".into(),
//!         ..Default::default()
//!     };
//!
//!     let chain = Arc::new(ChainClient::connect(&config).await?);
//!     let registry = LandRegistry::new(Arc::clone(&chain), &config.registry_address)?;
//!
//!     let property = registry.get_property(1).await?;
//!     println!("Property 1 is owned by {:#x} ({})", property.owner, property.state);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bids;
pub mod chain;
pub mod chat;
pub mod config;
pub mod geocode;
pub mod pinning;
pub mod profile;
pub mod roles;
pub mod websocket;

// Re-export top-level types for convenience
pub use chain::{
    ChainClient, ChainConfig, ChainError, ChainResult, LandRegistry, Marketplace, Property,
    PropertyState, PurchaseRequest, RequestState, Sale, SaleState, TxOutcome, UserRegistry,
};

pub use bids::{rank_bids, RankedBid};

pub use roles::{derive_roles, Role, RoleFlags};

pub use chat::{
    conversation_id, merge_sources, ChatEnvelope, ChatMessage, ChatStore, ChatSyncConfig,
    ChatSyncManager, ChatSyncState, InboxEntry, P2pChat, P2pEvent, P2pHandle, SyncStatus,
};

pub use pinning::{GatewayClient, GatewayConfig, PinningClient, PinningConfig, PinningError};

pub use geocode::{GeocodeClient, GeocodeConfig, GeocodeError, GeocodeResult};

pub use profile::{ProfileDocument, ProfileError, ProfileInput};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::{ClientMessage, ConnectionHub, HubConfig, ServerMessage, WsEvent};

pub use config::{Config, ConfigError};
