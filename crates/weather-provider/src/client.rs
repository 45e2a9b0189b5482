//! Current-Weather Client
//!
//! Provides the provider trait used by the fetcher and an HTTP
//! implementation for OpenWeatherMap-compatible endpoints.

use crate::error::ProviderError;
use crate::observation::ProviderReading;
use crate::response::parse_reading;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for provider requests
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Endpoint, credential and unit system shared by every request of a cycle
#[derive(Clone)]
pub struct RequestTemplate {
    pub base_url: String,
    pub api_key: String,
    pub units: String,
}

impl RequestTemplate {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            units: crate::DEFAULT_UNITS.to_string(),
        }
    }
}

impl fmt::Debug for RequestTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTemplate")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .finish()
    }
}

/// Source of current conditions for a coordinate
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Issue exactly one request for the given coordinate
    async fn current(
        &self,
        template: &RequestTemplate,
        lat: f64,
        lon: f64,
    ) -> Result<ProviderReading, ProviderError>;
}

/// HTTP client for OpenWeatherMap-compatible current-weather endpoints
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: reqwest::Client,
}

impl OpenWeatherClient {
    /// Create a client with the default request timeout
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        info!("Creating weather provider client (timeout {:?})", timeout);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Setup(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(
        &self,
        template: &RequestTemplate,
        lat: f64,
        lon: f64,
    ) -> Result<ProviderReading, ProviderError> {
        debug!("Requesting current weather for ({}, {})", lat, lon);

        let response = self
            .http
            .get(&template.base_url)
            .query(&[("lat", lat), ("lon", lon)])
            .query(&[
                ("appid", template.api_key.as_str()),
                ("units", template.units.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(ProviderError::Throttled { retry_after });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_reading(&body)
    }
}
