//! Pinning Service Client
//!
//! HTTP client for the IPFS pinning service (Pinata-compatible API).
//! Pins small JSON documents under metadata names, finds the latest pin
//! for a name, and unpins superseded content. Every call has a fixed
//! wall-clock timeout and classifies failures so callers can degrade to
//! local-only mode instead of blocking.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Configuration for the pinning client
#[derive(Debug, Clone)]
pub struct PinningConfig {
    /// Base URL of the pinning API (e.g., "https://api.pinata.cloud")
    pub base_url: String,
    /// Bearer token (JWT); supplied via LANDLEDGER_PINNING_JWT
    pub jwt: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for PinningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pinata.cloud".to_string(),
            jwt: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Pinning service client
pub struct PinningClient {
    client: Client,
    config: PinningConfig,
}

impl PinningClient {
    /// Create a new client with the given configuration
    pub fn new(config: PinningConfig) -> Result<Self, PinningError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(PinningError::Request)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &PinningConfig {
        &self.config
    }

    /// Verify the configured credential against the service
    pub async fn test_authentication(&self) -> Result<(), PinningError> {
        let url = format!("{}/data/testAuthentication", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.jwt)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            Ok(())
        } else if response.status().as_u16() == 401 {
            Err(PinningError::Unauthorized)
        } else {
            Err(PinningError::Unavailable)
        }
    }

    /// Pin a JSON document under a metadata name, returning its CID
    pub async fn pin_json(&self, name: &str, content: &Value) -> Result<String, PinningError> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.config.base_url);

        let body = PinJsonRequest {
            pinata_content: content.clone(),
            pinata_metadata: PinMetadata {
                name: name.to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.jwt)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            let result: PinJsonResponse = response.json().await.map_err(PinningError::Request)?;
            Ok(result.ipfs_hash)
        } else {
            Err(api_error(response).await)
        }
    }

    /// Pin a raw file (property documents, scans) under a metadata name
    pub async fn pin_file(&self, name: &str, bytes: Vec<u8>) -> Result<String, PinningError> {
        let url = format!("{}/pinning/pinFileToIPFS", self.config.base_url);

        let metadata = serde_json::json!({ "name": name }).to_string();
        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(name.to_string()),
            )
            .text("pinataMetadata", metadata);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            let result: PinJsonResponse = response.json().await.map_err(PinningError::Request)?;
            Ok(result.ipfs_hash)
        } else {
            Err(api_error(response).await)
        }
    }

    /// CID of the most recent pin carrying a metadata name, if any
    pub async fn find_latest_by_name(&self, name: &str) -> Result<Option<String>, PinningError> {
        let url = format!(
            "{}/data/pinList?status=pinned&pageLimit=1&metadata[name]={}",
            self.config.base_url,
            urlencoding::encode(name)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.jwt)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            let result: PinListResponse = response.json().await.map_err(PinningError::Request)?;
            Ok(result.rows.into_iter().next().map(|r| r.ipfs_pin_hash))
        } else {
            Err(api_error(response).await)
        }
    }

    /// Remove a pin by CID
    pub async fn unpin(&self, cid: &str) -> Result<(), PinningError> {
        let url = format!("{}/pinning/unpin/{}", self.config.base_url, cid);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.config.jwt)
            .send()
            .await
            .map_err(classify)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    /// Replace the pin stored under a name: pin the new content, then
    /// best-effort unpin the superseded CID.
    pub async fn replace_json(&self, name: &str, content: &Value) -> Result<String, PinningError> {
        let previous = self.find_latest_by_name(name).await.unwrap_or(None);
        let cid = self.pin_json(name, content).await?;

        if let Some(old) = previous {
            if old != cid {
                if let Err(e) = self.unpin(&old).await {
                    tracing::debug!(cid = %old, error = %e, "Failed to unpin superseded snapshot");
                }
            }
        }

        Ok(cid)
    }
}

/// Classify a transport error into the failure taxonomy
fn classify(e: reqwest::Error) -> PinningError {
    if e.is_timeout() {
        PinningError::Timeout
    } else if e.is_connect() {
        PinningError::Unavailable
    } else {
        PinningError::Request(e)
    }
}

/// Drain a non-success response into an API error
async fn api_error(response: reqwest::Response) -> PinningError {
    let status = response.status();
    if status.as_u16() == 401 {
        return PinningError::Unauthorized;
    }
    let message = response.text().await.unwrap_or_default();
    PinningError::Api {
        status: status.as_u16(),
        message,
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct PinJsonRequest {
    #[serde(rename = "pinataContent")]
    pinata_content: Value,
    #[serde(rename = "pinataMetadata")]
    pinata_metadata: PinMetadata,
}

#[derive(Debug, Serialize)]
struct PinMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PinJsonResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Deserialize)]
struct PinListResponse {
    #[serde(default)]
    rows: Vec<PinListRow>,
}

#[derive(Debug, Deserialize)]
struct PinListRow {
    ipfs_pin_hash: String,
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the pinning service
#[derive(Error, Debug)]
pub enum PinningError {
    #[error("Pinning service unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Pinning credential rejected")]
    Unauthorized,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PinningConfig::default();
        assert_eq!(config.base_url, "https://api.pinata.cloud");
        assert_eq!(config.request_timeout_ms, 10_000);
        assert!(config.jwt.is_empty());
    }

    #[test]
    fn pin_request_serializes_with_service_field_names() {
        let body = PinJsonRequest {
            pinata_content: serde_json::json!({"messages": []}),
            pinata_metadata: PinMetadata {
                name: "landledger-chat-0xaa:0xbb".to_string(),
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("pinataContent").is_some());
        assert_eq!(
            json["pinataMetadata"]["name"],
            "landledger-chat-0xaa:0xbb"
        );
    }

    #[test]
    fn pin_response_parses_service_casing() {
        let raw = r#"{"IpfsHash": "bafybeihash", "PinSize": 42, "Timestamp": "2026-01-01T00:00:00Z"}"#;
        let parsed: PinJsonResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.ipfs_hash, "bafybeihash");
    }
}
