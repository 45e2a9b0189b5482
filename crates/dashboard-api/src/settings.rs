//! Service Settings
//!
//! Layered with the `config` crate:
//! `{dir}/default` → `{dir}/{RUN_MODE}` → `{dir}/local` → environment
//! (`WEATHER_DASH__PROVIDER__API_KEY` etc.). `OWM_API_KEY` is honoured as a
//! shortcut for the provider key.

use alerting::AlertThresholds;
use config::{Config, ConfigError, Environment, File};
use fetch_scheduler::FetcherConfig;
use serde::Deserialize;
use thiserror::Error;
use weather_provider::Subdivision;

use crate::aggregation::AggregatorConfig;
use crate::rate_limit::RateLimitConfig;

/// Environment prefix for overrides
pub const ENV_PREFIX: &str = "WEATHER_DASH";

/// Legacy variable carrying only the provider key
pub const LEGACY_API_KEY_VAR: &str = "OWM_API_KEY";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_addr")]
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,
    #[serde(default = "default_true")]
    pub delay_after_last: bool,
    /// One limiter across all concurrent cycles
    #[serde(default)]
    pub shared_limiter: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub thresholds: AlertThresholds,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            units: default_units(),
            max_requests_per_minute: default_max_requests_per_minute(),
            safety_margin_ms: default_safety_margin_ms(),
            delay_after_last: true,
            shared_limiter: false,
            timeout_secs: default_timeout_secs(),
            thresholds: AlertThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoundarySettings {
    /// File path or http(s) URL of the boundary FeatureCollection
    #[serde(default = "default_boundary_location")]
    pub location: String,
    #[serde(default = "default_name_property")]
    pub name_property: String,
    /// Load once per process instead of once per cycle
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            location: default_boundary_location(),
            name_property: default_name_property(),
            cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_per_second")]
    pub per_second: u64,
    #[serde(default = "default_burst_size")]
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            per_second: default_per_second(),
            burst_size: default_burst_size(),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub boundary: BoundarySettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Monitored subdivisions, polled in this order
    #[serde(default)]
    pub subdivisions: Vec<Subdivision>,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_base_url() -> String {
    weather_provider::DEFAULT_BASE_URL.to_string()
}
fn default_units() -> String {
    weather_provider::DEFAULT_UNITS.to_string()
}
fn default_max_requests_per_minute() -> u32 {
    60
}
fn default_safety_margin_ms() -> u64 {
    50
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_boundary_location() -> String {
    "data/pasay.geojson".to_string()
}
fn default_name_property() -> String {
    boundary::DEFAULT_NAME_PROPERTY.to_string()
}
fn default_per_second() -> u64 {
    2
}
fn default_burst_size() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Settings {
    /// Load from the default config directory and environment
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_with(&config_dir(), ENV_PREFIX, Some(LEGACY_API_KEY_VAR))
    }

    /// Load from an explicit directory and environment prefix
    pub fn load_with(
        config_dir: &str,
        env_prefix: &str,
        legacy_api_key_var: Option<&str>,
    ) -> Result<Self, SettingsError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(var) = legacy_api_key_var {
            if let Ok(api_key) = std::env::var(var) {
                builder = builder.set_override("provider.api_key", api_key)?;
            }
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.fetcher_config()?;

        if self.rate_limit.per_second == 0 {
            return Err(SettingsError::Invalid {
                key: "rate_limit.per_second",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.rate_limit.burst_size == 0 {
            return Err(SettingsError::Invalid {
                key: "rate_limit.burst_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(s) = self.subdivisions.iter().find(|s| s.name.trim().is_empty()) {
            return Err(SettingsError::Invalid {
                key: "subdivisions",
                reason: format!("entry at ({}, {}) has an empty name", s.lat, s.lon),
            });
        }
        Ok(())
    }

    /// Conditions the service starts with but degrades under
    pub fn notices(&self) -> Vec<&'static str> {
        let mut notices = Vec::new();
        if self.subdivisions.is_empty() {
            notices.push("No subdivisions configured; aggregation cycles will be empty");
        }
        let key_missing = self
            .provider
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty());
        if key_missing {
            notices.push("Provider API key not set; weather requests will be rejected");
        }
        notices
    }

    pub fn fetcher_config(&self) -> Result<FetcherConfig, SettingsError> {
        let base = FetcherConfig::with_rate(self.provider.max_requests_per_minute).map_err(|e| {
            SettingsError::Invalid {
                key: "provider.max_requests_per_minute",
                reason: e.to_string(),
            }
        })?;
        Ok(FetcherConfig {
            safety_margin_ms: self.provider.safety_margin_ms,
            delay_after_last: self.provider.delay_after_last,
            thresholds: self.provider.thresholds,
            ..base
        })
    }

    pub fn aggregator_config(&self) -> Result<AggregatorConfig, SettingsError> {
        Ok(AggregatorConfig {
            base_url: self.provider.base_url.clone(),
            units: self.provider.units.clone(),
            api_key: self.provider.api_key.clone(),
            fetcher: self.fetcher_config()?,
            name_property: self.boundary.name_property.clone(),
        })
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            per_second: self.rate_limit.per_second,
            burst_size: self.rate_limit.burst_size,
        }
    }
}

/// Config directory, overridable with `WEATHER_DASH_CONFIG_DIR`
fn config_dir() -> String {
    std::env::var("WEATHER_DASH_CONFIG_DIR").unwrap_or_else(|_| "config".into())
}
