//! Fetcher configuration

use crate::error::SchedulerError;
use alerting::AlertThresholds;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const MILLIS_PER_MINUTE: u64 = 60_000;

const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(60) {
    Some(rate) => rate,
    None => panic!("default rate must be non-zero"),
};

/// Configuration for the rate-limited fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Provider cap (default: 60 requests per minute)
    pub max_requests_per_minute: NonZeroU32,
    /// Added to every inter-request delay (default: 50ms)
    pub safety_margin_ms: u64,
    /// Also sleep after the final subdivision of a cycle
    pub delay_after_last: bool,
    /// Tier thresholds applied to every live observation
    #[serde(default)]
    pub thresholds: AlertThresholds,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            safety_margin_ms: 50,
            delay_after_last: true,
            thresholds: AlertThresholds::default(),
        }
    }
}

impl FetcherConfig {
    /// Create a config for the given cap with default margin
    pub fn with_rate(requests_per_minute: u32) -> Result<Self, SchedulerError> {
        let max_requests_per_minute = NonZeroU32::new(requests_per_minute)
            .ok_or(SchedulerError::InvalidRate(requests_per_minute))?;
        Ok(Self {
            max_requests_per_minute,
            ..Default::default()
        })
    }

    /// Delay between consecutive requests: `ceil(60000 / cap) + margin` ms
    pub fn delay(&self) -> Duration {
        let cap = u64::from(self.max_requests_per_minute.get());
        Duration::from_millis(MILLIS_PER_MINUTE.div_ceil(cap) + self.safety_margin_ms)
    }

    /// Lower bound on the fetch phase for `n` subdivisions
    pub fn minimum_cycle_time(&self, n: usize) -> Duration {
        let gaps = if self.delay_after_last { n } else { n.saturating_sub(1) };
        self.delay() * u32::try_from(gaps).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay() {
        let config = FetcherConfig::default();
        assert_eq!(config.delay(), Duration::from_millis(1050));
    }

    #[test]
    fn test_delay_rounds_up() {
        let config = FetcherConfig {
            safety_margin_ms: 0,
            ..FetcherConfig::with_rate(7).unwrap()
        };
        // 60000 / 7 = 8571.43
        assert_eq!(config.delay(), Duration::from_millis(8572));
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(matches!(
            FetcherConfig::with_rate(0),
            Err(SchedulerError::InvalidRate(0))
        ));
    }

    #[test]
    fn test_minimum_cycle_time() {
        let mut config = FetcherConfig::with_rate(60).unwrap();
        config.safety_margin_ms = 0;
        config.delay_after_last = false;
        assert_eq!(config.minimum_cycle_time(3), Duration::from_secs(2));
        assert_eq!(config.minimum_cycle_time(0), Duration::ZERO);

        config.delay_after_last = true;
        assert_eq!(config.minimum_cycle_time(3), Duration::from_secs(3));
    }
}
