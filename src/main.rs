//! LandLedger Service
//!
//! Run with: cargo run --bin landledger
//!
//! # Configuration
//!
//! Loaded from config.toml (see `landledger-cli config`) with environment
//! overrides:
//! - `LANDLEDGER_RPC_URL`: JSON-RPC node endpoint
//! - `LANDLEDGER_REGISTRY_ADDRESS` / `LANDLEDGER_MARKET_ADDRESS` /
//!   `LANDLEDGER_USERS_ADDRESS`: deployed contract addresses
//! - `LANDLEDGER_ADMIN_ADDRESS`: the single authoritative admin wallet
//! - `LANDLEDGER_SIGNER_KEY`: hex key for submitting transactions (optional)
//! - `LANDLEDGER_PINNING_JWT`: pinning service credential (optional)
//! - `LANDLEDGER_API_HOST` / `LANDLEDGER_API_PORT`: bind address
//! - `RUST_LOG`: log filter override

use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use landledger::api::{serve, ApiConfig, AppState};
use landledger::chain::{ChainClient, ChainConfig, LandRegistry, Marketplace, UserRegistry};
use landledger::chat::{ChatStore, ChatSyncConfig, ChatSyncManager, P2pChat, P2pEvent};
use landledger::config::Config;
use landledger::geocode::{GeocodeClient, GeocodeConfig};
use landledger::pinning::{GatewayClient, GatewayConfig, PinningClient, PinningConfig};
use landledger::websocket::{ConnectionHub, HubConfig, WsEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();

    init_tracing(&config);

    tracing::info!("Starting LandLedger service v{}", env!("CARGO_PKG_VERSION"));

    if config.chain.registry_address.is_empty()
        || config.chain.market_address.is_empty()
        || config.chain.users_address.is_empty()
    {
        bail!(
            "Contract addresses missing; set LANDLEDGER_REGISTRY_ADDRESS, \
             LANDLEDGER_MARKET_ADDRESS and LANDLEDGER_USERS_ADDRESS"
        );
    }
    if config.chain.admin_address.is_empty() {
        bail!("Admin wallet missing; set LANDLEDGER_ADMIN_ADDRESS");
    }

    // Chain client and contract wrappers
    let chain_config = ChainConfig {
        rpc_url: config.chain.rpc_url.clone(),
        chain_id: config.chain.chain_id,
        registry_address: config.chain.registry_address.clone(),
        market_address: config.chain.market_address.clone(),
        users_address: config.chain.users_address.clone(),
        admin_address: config.chain.admin_address.clone(),
        signer_key: config.chain.signer_key.clone(),
    };

    let chain = Arc::new(
        ChainClient::connect(&chain_config)
            .await
            .context("Failed to connect to the chain")?,
    );

    match chain.ping().await {
        Ok(block) => tracing::info!(block, rpc = %config.chain.rpc_url, "Node connection verified"),
        Err(e) => tracing::warn!(error = %e, "Node not reachable yet; reads will fail until it is"),
    }

    let registry = Arc::new(LandRegistry::new(
        Arc::clone(&chain),
        &chain_config.registry_address,
    )?);
    let market = Arc::new(Marketplace::new(
        Arc::clone(&chain),
        &chain_config.market_address,
    )?);
    let users = Arc::new(UserRegistry::new(
        Arc::clone(&chain),
        &chain_config.users_address,
    )?);

    // Pinning service; missing credential runs the service local-only
    let pinning = if config.pinning.enabled && !config.pinning.jwt.is_empty() {
        let client = Arc::new(PinningClient::new(PinningConfig {
            base_url: config.pinning.base_url.clone(),
            jwt: config.pinning.jwt.clone(),
            request_timeout_ms: config.pinning.request_timeout_ms,
        })?);

        match client.test_authentication().await {
            Ok(_) => tracing::info!(url = %config.pinning.base_url, "Pinning service verified"),
            Err(e) => {
                tracing::warn!(error = %e, "Pinning service not available (chat backup degraded)")
            }
        }

        Some(client)
    } else {
        tracing::info!("Pinning disabled (set LANDLEDGER_PINNING_JWT to enable cloud backup)");
        None
    };

    let gateway = Arc::new(GatewayClient::new(GatewayConfig {
        base_url: config.pinning.gateway_url.clone(),
        request_timeout_ms: config.pinning.request_timeout_ms,
    })?);

    let geocode = Arc::new(GeocodeClient::new(GeocodeConfig {
        base_url: config.geocode.base_url.clone(),
        user_agent: config.geocode.user_agent.clone(),
        request_timeout_ms: 8_000,
    })?);

    // Local chat store
    let db_path = std::path::Path::new(&config.chat.data_dir).join("chat.db");
    let store = Arc::new(ChatStore::open(&db_path).context("Failed to open chat store")?);
    tracing::info!(path = %db_path.display(), "Chat store opened");

    // P2P chat log
    let ws_hub = Arc::new(ConnectionHub::new(HubConfig::default()));

    let (p2p_handle, p2p_events) = if config.chat.p2p_enabled {
        let (p2p, handle, events) = P2pChat::new(&config.chat.topic);
        tokio::spawn(async move {
            if let Err(e) = p2p.run().await {
                tracing::error!(error = %e, "P2P chat log stopped");
            }
        });
        (Some(handle), Some(events))
    } else {
        tracing::info!("P2P chat disabled");
        (None, None)
    };

    let chat = Arc::new(ChatSyncManager::new(
        store,
        pinning.clone(),
        pinning.as_ref().map(|_| Arc::clone(&gateway)),
        p2p_handle,
        ChatSyncConfig {
            backup_interval_secs: config.chat.backup_interval_secs,
            backup_enabled: config.pinning.enabled,
        },
    ));

    // Pump p2p arrivals into the store and out to dashboards
    if let Some(mut events) = p2p_events {
        let chat_for_pump = Arc::clone(&chat);
        let hub_for_pump = Arc::clone(&ws_hub);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    P2pEvent::Envelope(envelope) => {
                        chat_for_pump.handle_incoming(&envelope).await;
                        hub_for_pump.publish(WsEvent::chat(
                            &envelope.conversation,
                            envelope.message,
                        ));
                    }
                    P2pEvent::PeerDiscovered(peer_id) => {
                        hub_for_pump.publish(WsEvent::peer(&peer_id, true));
                    }
                    P2pEvent::PeerExpired(peer_id) => {
                        hub_for_pump.publish(WsEvent::peer(&peer_id, false));
                    }
                    P2pEvent::Listening(_) => {}
                }
            }
        });
    }

    // Periodic cloud backup
    Arc::clone(&chat).start_background_backup();

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        cors_origins: config.api.cors_origins.clone(),
        request_timeout_secs: config.api.request_timeout_secs,
    };

    let state = AppState {
        chain,
        registry,
        market,
        users,
        pinning,
        gateway,
        geocode,
        chat,
        ws_hub,
        config: Arc::new(api_config.clone()),
        start_time: Instant::now(),
    };

    serve(state, &api_config).await?;

    tracing::info!("LandLedger service stopped");
    Ok(())
}

/// Initialize tracing from the logging section
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("landledger={},tower_http=debug", config.logging.level).into()
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
