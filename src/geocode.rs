//! Geocoding Client
//!
//! Forward geocoding of free-text property locations via a
//! Nominatim-compatible HTTP API. Purely cosmetic data for map pins;
//! every failure is soft.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the geocoding client
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    /// Base URL of the geocoding API
    pub base_url: String,
    /// User agent; Nominatim's usage policy requires an identifying one
    pub user_agent: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "landledger/0.1".to_string(),
            request_timeout_ms: 8_000,
        }
    }
}

/// A geocoding match
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Errors from the geocoding API
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding service unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}")]
    Api { status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Nominatim-style geocoding client
pub struct GeocodeClient {
    client: Client,
    config: GeocodeConfig,
}

impl GeocodeClient {
    pub fn new(config: GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(GeocodeError::Request)?;

        Ok(Self { client, config })
    }

    /// Resolve a free-text query to candidate coordinates, best first
    pub async fn search(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let url = format!(
            "{}/search?format=json&limit=5&q={}",
            self.config.base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeocodeError::Timeout
            } else if e.is_connect() {
                GeocodeError::Unavailable
            } else {
                GeocodeError::Request(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(GeocodeError::Api {
                status: response.status().as_u16(),
            });
        }

        let raw: Vec<NominatimPlace> = response.json().await.map_err(GeocodeError::Request)?;

        raw.into_iter()
            .map(|place| {
                Ok(GeocodeResult {
                    latitude: place
                        .lat
                        .parse()
                        .map_err(|_| GeocodeError::Parse(format!("bad latitude {}", place.lat)))?,
                    longitude: place
                        .lon
                        .parse()
                        .map_err(|_| GeocodeError::Parse(format!("bad longitude {}", place.lon)))?,
                    display_name: place.display_name,
                })
            })
            .collect()
    }
}

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_parses_stringly_typed_coordinates() {
        let raw = r#"[{"lat": "12.9716", "lon": "77.5946", "display_name": "Bengaluru, Karnataka"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(raw).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].lat, "12.9716");
    }

    #[test]
    fn default_config_has_identifying_user_agent() {
        let config = GeocodeConfig::default();
        assert!(config.user_agent.starts_with("landledger"));
    }
}
