//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//! Credentials (signer key, pinning JWT) are expected from the
//! environment; the file fields exist for local development only.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub pinning: PinningSection,

    #[serde(default)]
    pub chat: ChatSection,

    #[serde(default)]
    pub geocode: GeocodeSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Chain connection and contract addresses
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Chain id for signing; queried from the node when absent
    pub chain_id: Option<u64>,

    #[serde(default)]
    pub registry_address: String,

    #[serde(default)]
    pub market_address: String,

    #[serde(default)]
    pub users_address: String,

    /// The single authoritative admin wallet
    #[serde(default)]
    pub admin_address: String,

    /// Hex private key for writes; prefer LANDLEDGER_SIGNER_KEY
    pub signer_key: Option<String>,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: None,
            registry_address: String::new(),
            market_address: String::new(),
            users_address: String::new(),
            admin_address: String::new(),
            signer_key: None,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Pinning service and gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PinningSection {
    #[serde(default = "default_pinning_url")]
    pub base_url: String,

    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Bearer token; always prefer LANDLEDGER_PINNING_JWT
    #[serde(default)]
    pub jwt: String,

    #[serde(default = "default_pinning_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_pinning_enabled")]
    pub enabled: bool,
}

fn default_pinning_url() -> String {
    "https://api.pinata.cloud".to_string()
}

fn default_gateway_url() -> String {
    "https://gateway.pinata.cloud/ipfs".to_string()
}

fn default_pinning_timeout() -> u64 {
    10_000
}

fn default_pinning_enabled() -> bool {
    true
}

impl Default for PinningSection {
    fn default() -> Self {
        Self {
            base_url: default_pinning_url(),
            gateway_url: default_gateway_url(),
            jwt: String::new(),
            request_timeout_ms: default_pinning_timeout(),
            enabled: default_pinning_enabled(),
        }
    }
}

/// Chat subsystem configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_p2p_enabled")]
    pub p2p_enabled: bool,

    #[serde(default = "default_chat_topic")]
    pub topic: String,

    #[serde(default = "default_backup_interval")]
    pub backup_interval_secs: u64,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("landledger").to_string_lossy().to_string())
        .unwrap_or_else(|| "./landledger_data".to_string())
}

fn default_p2p_enabled() -> bool {
    true
}

fn default_chat_topic() -> String {
    crate::chat::DEFAULT_TOPIC.to_string()
}

fn default_backup_interval() -> u64 {
    300
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            p2p_enabled: default_p2p_enabled(),
            topic: default_chat_topic(),
            backup_interval_secs: default_backup_interval(),
        }
    }
}

/// Geocoding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeSection {
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    #[serde(default = "default_geocode_agent")]
    pub user_agent: String,
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocode_agent() -> String {
    "landledger/0.1".to_string()
}

impl Default for GeocodeSection {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
            user_agent: default_geocode_agent(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("landledger").join("config.toml")),
            Some(PathBuf::from("/etc/landledger/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Chain overrides
        if let Ok(url) = std::env::var("LANDLEDGER_RPC_URL") {
            self.chain.rpc_url = url;
        }
        if let Ok(addr) = std::env::var("LANDLEDGER_REGISTRY_ADDRESS") {
            self.chain.registry_address = addr;
        }
        if let Ok(addr) = std::env::var("LANDLEDGER_MARKET_ADDRESS") {
            self.chain.market_address = addr;
        }
        if let Ok(addr) = std::env::var("LANDLEDGER_USERS_ADDRESS") {
            self.chain.users_address = addr;
        }
        if let Ok(addr) = std::env::var("LANDLEDGER_ADMIN_ADDRESS") {
            self.chain.admin_address = addr;
        }
        if let Ok(key) = std::env::var("LANDLEDGER_SIGNER_KEY") {
            self.chain.signer_key = Some(key);
        }

        // API overrides
        if let Ok(host) = std::env::var("LANDLEDGER_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("LANDLEDGER_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Pinning overrides
        if let Ok(url) = std::env::var("LANDLEDGER_PINNING_URL") {
            self.pinning.base_url = url;
        }
        if let Ok(jwt) = std::env::var("LANDLEDGER_PINNING_JWT") {
            self.pinning.jwt = jwt;
        }
        if let Ok(url) = std::env::var("LANDLEDGER_GATEWAY_URL") {
            self.pinning.gateway_url = url;
        }

        // Chat overrides
        if let Ok(dir) = std::env::var("LANDLEDGER_DATA_DIR") {
            self.chat.data_dir = dir;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("LANDLEDGER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LANDLEDGER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# LandLedger Configuration
#
# Environment variables override these settings:
# - LANDLEDGER_RPC_URL
# - LANDLEDGER_REGISTRY_ADDRESS / LANDLEDGER_MARKET_ADDRESS / LANDLEDGER_USERS_ADDRESS
# - LANDLEDGER_ADMIN_ADDRESS
# - LANDLEDGER_SIGNER_KEY
# - LANDLEDGER_API_HOST / LANDLEDGER_API_PORT
# - LANDLEDGER_PINNING_URL / LANDLEDGER_PINNING_JWT / LANDLEDGER_GATEWAY_URL
# - LANDLEDGER_DATA_DIR
# - LANDLEDGER_LOG_LEVEL / LANDLEDGER_LOG_FORMAT

[chain]
# JSON-RPC endpoint of the node
rpc_url = "http://localhost:8545"

# Deployed contract addresses
registry_address = ""
market_address = ""
users_address = ""

# The single authoritative admin wallet
admin_address = ""

[api]
# API server host and port
host = "0.0.0.0"
port = 8086

# Allowed CORS origins (dashboard dev servers)
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[pinning]
# Pinning service API; credential comes from LANDLEDGER_PINNING_JWT
base_url = "https://api.pinata.cloud"

# IPFS gateway for reads
gateway_url = "https://gateway.pinata.cloud/ipfs"

# Request timeout (ms)
request_timeout_ms = 10000

# Disable to run local-only
enabled = true

[chat]
# Directory for the local chat cache
data_dir = "~/.local/share/landledger"

# Join the p2p chat log
p2p_enabled = true

# Gossipsub topic
topic = "landledger-chat-v1"

# Cloud backup interval (seconds)
backup_interval_secs = 300

[geocode]
# Nominatim-compatible geocoding API
base_url = "https://nominatim.openstreetmap.org"
user_agent = "landledger/0.1"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
        assert_eq!(config.api.port, 8086);
        assert!(config.pinning.enabled);
        assert!(config.chat.p2p_enabled);
        assert!(config.chain.signer_key.is_none());
    }

    #[test]
    fn generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8086);
        assert_eq!(config.chat.topic, "landledger-chat-v1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chain]
            admin_address = "0x52908400098527886E0F7030069857D2E4169EE7"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.chain.admin_address,
            "0x52908400098527886E0F7030069857D2E4169EE7"
        );
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
        assert_eq!(config.pinning.base_url, "https://api.pinata.cloud");
    }
}
