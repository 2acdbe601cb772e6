//! IPFS Gateway Fetch
//!
//! Plain HTTP GET by content identifier, used to resolve profile and
//! property documents. Same timeout and failure classification as the
//! pinning client; the gateway needs no credential.

use serde_json::Value;

use super::client::PinningError;

/// Configuration for gateway fetches
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway base URL (e.g., "https://gateway.pinata.cloud/ipfs")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gateway.pinata.cloud/ipfs".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Read-only gateway client
pub struct GatewayClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, PinningError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(PinningError::Request)?;

        Ok(Self { client, config })
    }

    /// Public URL of a CID on this gateway
    pub fn url_for(&self, cid: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), cid)
    }

    /// Fetch and parse a pinned JSON document
    pub async fn fetch_json(&self, cid: &str) -> Result<Value, PinningError> {
        let response = self
            .client
            .get(self.url_for(cid))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PinningError::Timeout
                } else if e.is_connect() {
                    PinningError::Unavailable
                } else {
                    PinningError::Request(e)
                }
            })?;

        if response.status().is_success() {
            response.json().await.map_err(PinningError::Request)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(PinningError::Api { status, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_construction_handles_trailing_slash() {
        let gw = GatewayClient::new(GatewayConfig {
            base_url: "https://gateway.pinata.cloud/ipfs/".to_string(),
            request_timeout_ms: 1_000,
        })
        .unwrap();

        assert_eq!(
            gw.url_for("bafybeihash"),
            "https://gateway.pinata.cloud/ipfs/bafybeihash"
        );
    }
}
