//! Aggregation Cycle
//!
//! Runs one fetch over the configured subdivisions, then joins the results
//! with the boundary geometry. Phases:
//!
//! ```text
//! Idle -> Fetching -> Merging -> Done
//!                  \-> Partial      (boundary data unavailable)
//! ```
//!
//! Only a missing provider credential fails the cycle, and it does so
//! before any provider request is made.

use alerting::AlertSummary;
use boundary::{merge_weather, BoundarySource};
use fetch_scheduler::{into_observations, FetcherConfig, RateLimitedFetcher, SharedLimiter};
use geojson::FeatureCollection;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};
use weather_provider::{
    Observation, ProviderError, RequestTemplate, Subdivision, WeatherProvider,
};

/// Errors that fail an aggregation or point request
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Provider credential absent or blank
    #[error("API Key not configured")]
    MissingApiKey,

    /// Point lookup failed (cycles never return this)
    #[error("Provider request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Cycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Merging,
    Done,
    Partial,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Fetching => "fetching",
            Phase::Merging => "merging",
            Phase::Done => "done",
            Phase::Partial => "partial",
        };
        f.write_str(name)
    }
}

/// Response body of the aggregation endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CombinedResult {
    pub areas: Vec<Observation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<FeatureCollection>,
}

/// Outcome of one cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub combined: CombinedResult,
    /// `Done` or `Partial`
    pub phase: Phase,
    /// Subdivisions that got a fallback observation
    pub fallbacks: usize,
    pub summary: AlertSummary,
    pub elapsed: Duration,
}

/// Static settings for an aggregator
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub base_url: String,
    pub units: String,
    /// Checked on every request, not at startup
    pub api_key: Option<String>,
    pub fetcher: FetcherConfig,
    /// Feature property carrying the subdivision name
    pub name_property: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: weather_provider::DEFAULT_BASE_URL.to_string(),
            units: weather_provider::DEFAULT_UNITS.to_string(),
            api_key: None,
            fetcher: FetcherConfig::default(),
            name_property: boundary::DEFAULT_NAME_PROPERTY.to_string(),
        }
    }
}

/// Orchestrates fetcher, classifier and merger
pub struct Aggregator {
    provider: Arc<dyn WeatherProvider>,
    boundary: Arc<dyn BoundarySource>,
    config: AggregatorConfig,
    limiter: Option<Arc<SharedLimiter>>,
}

impl Aggregator {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        boundary: Arc<dyn BoundarySource>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            provider,
            boundary,
            config,
            limiter: None,
        }
    }

    /// Space provider requests across all concurrent cycles
    pub fn with_shared_limiter(mut self, limiter: Arc<SharedLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn boundary_source(&self) -> String {
        self.boundary.describe()
    }

    pub fn has_shared_limiter(&self) -> bool {
        self.limiter.is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.request_template().is_ok()
    }

    fn request_template(&self) -> Result<RequestTemplate, AggregationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(AggregationError::MissingApiKey)?;

        Ok(RequestTemplate {
            base_url: self.config.base_url.clone(),
            api_key: api_key.to_string(),
            units: self.config.units.clone(),
        })
    }

    fn fetcher(&self) -> RateLimitedFetcher {
        let fetcher = RateLimitedFetcher::new(Arc::clone(&self.provider), self.config.fetcher.clone());
        match &self.limiter {
            Some(limiter) => fetcher.with_shared_limiter(Arc::clone(limiter)),
            None => fetcher,
        }
    }

    /// Run one aggregation cycle over `subdivisions`
    pub async fn aggregate(
        &self,
        subdivisions: &[Subdivision],
    ) -> Result<CycleReport, AggregationError> {
        let started = Instant::now();
        let mut phase = Phase::Idle;

        let template = self.request_template()?;

        advance(&mut phase, Phase::Fetching);
        let outcomes = self.fetcher().fetch_all(subdivisions, &template).await;
        let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();
        let areas = into_observations(outcomes);

        let geojson = match self.boundary.load().await {
            Ok(collection) => {
                advance(&mut phase, Phase::Merging);
                match merge_weather(&collection, &areas, &self.config.name_property) {
                    Ok(merged) => {
                        advance(&mut phase, Phase::Done);
                        Some(merged)
                    }
                    Err(e) => {
                        warn!("Failed to merge weather into boundaries: {}", e);
                        advance(&mut phase, Phase::Partial);
                        None
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Failed to load boundary data from {}: {}",
                    self.boundary.describe(),
                    e
                );
                advance(&mut phase, Phase::Partial);
                None
            }
        };

        let summary = AlertSummary::from_alerts(areas.iter().map(|a| a.alert));
        let elapsed = started.elapsed();

        metrics::counter!("aggregation_cycles_total", "result" => phase.to_string()).increment(1);
        metrics::histogram!("aggregation_cycle_seconds").record(elapsed.as_secs_f64());

        info!(
            "Aggregation {} in {:.1}s: {} areas ({} critical, {} warning, {} safe, {} fallback)",
            phase,
            elapsed.as_secs_f64(),
            areas.len(),
            summary.critical,
            summary.warning,
            summary.safe,
            fallbacks
        );

        Ok(CycleReport {
            combined: CombinedResult { areas, geojson },
            phase,
            fallbacks,
            summary,
            elapsed,
        })
    }

    /// Fetch and classify a single coordinate. Unlike a cycle, provider
    /// failures are returned rather than replaced by a fallback.
    pub async fn observe_point(
        &self,
        subdivision: &Subdivision,
    ) -> Result<Observation, AggregationError> {
        let template = self.request_template()?;

        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let reading = self
            .provider
            .current(&template, subdivision.lat, subdivision.lon)
            .await?;

        Ok(Observation::from_reading(
            subdivision,
            &reading,
            &self.config.fetcher.thresholds,
        ))
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug!("Aggregation phase {} -> {}", phase, next);
    *phase = next;
}
