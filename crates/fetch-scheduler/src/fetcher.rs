//! Rate-Limited Fetcher Implementation

use crate::config::FetcherConfig;
use crate::limiter::SharedLimiter;
use crate::outcome::FetchOutcome;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use weather_provider::{Observation, RequestTemplate, Subdivision, WeatherProvider};

/// Polls the provider for each subdivision, one request at a time
pub struct RateLimitedFetcher {
    provider: Arc<dyn WeatherProvider>,
    config: FetcherConfig,
    limiter: Option<Arc<SharedLimiter>>,
}

impl RateLimitedFetcher {
    /// Create a fetcher with its own fixed inter-request delay
    pub fn new(provider: Arc<dyn WeatherProvider>, config: FetcherConfig) -> Self {
        Self {
            provider,
            config,
            limiter: None,
        }
    }

    /// Also wait on a limiter shared with other concurrent fetchers
    pub fn with_shared_limiter(mut self, limiter: Arc<SharedLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Delay slept after each request
    pub fn delay(&self) -> Duration {
        self.config.delay()
    }

    /// Fetch one observation per subdivision, in input order.
    ///
    /// Never fails: a subdivision whose request fails gets a fallback
    /// observation and the cycle continues. Exactly one provider call is
    /// made per subdivision, and consecutive calls are at least
    /// [`delay`](Self::delay) apart.
    pub async fn fetch_all(
        &self,
        subdivisions: &[Subdivision],
        template: &RequestTemplate,
    ) -> Vec<FetchOutcome> {
        let delay = self.config.delay();
        info!(
            "Fetching weather for {} subdivisions ({:?} between requests)",
            subdivisions.len(),
            delay
        );

        let mut outcomes = Vec::with_capacity(subdivisions.len());

        for (index, subdivision) in subdivisions.iter().enumerate() {
            if let Some(limiter) = &self.limiter {
                limiter.acquire().await;
            }

            outcomes.push(self.fetch_one(subdivision, template).await);

            let is_last = index + 1 == subdivisions.len();
            if !is_last || self.config.delay_after_last {
                tokio::time::sleep(delay).await;
            }
        }

        let fallbacks = outcomes.iter().filter(|o| o.is_fallback()).count();
        info!(
            "Fetch complete: {} live, {} fallback",
            outcomes.len() - fallbacks,
            fallbacks
        );

        outcomes
    }

    async fn fetch_one(&self, subdivision: &Subdivision, template: &RequestTemplate) -> FetchOutcome {
        match self
            .provider
            .current(template, subdivision.lat, subdivision.lon)
            .await
        {
            Ok(reading) => {
                let observation =
                    Observation::from_reading(subdivision, &reading, &self.config.thresholds);
                debug!(
                    "{}: {} ({})",
                    subdivision.name, observation.condition, observation.alert
                );
                metrics::counter!("weather_provider_requests_total", "outcome" => "live")
                    .increment(1);
                FetchOutcome::Live(observation)
            }
            Err(error) => {
                if error.is_throttled() {
                    warn!(
                        "Provider throttled request for {}: {}",
                        subdivision.name, error
                    );
                } else {
                    warn!("Error fetching weather for {}: {}", subdivision.name, error);
                }
                metrics::counter!("weather_provider_requests_total", "outcome" => "fallback")
                    .increment(1);
                FetchOutcome::Fallback {
                    observation: Observation::fallback(subdivision),
                    error,
                }
            }
        }
    }
}
