//! Process-wide provider limiter
//!
//! Concurrent aggregation cycles each keep their own fixed delay, so
//! without coordination the provider sees `cap × callers` requests per
//! minute. A `SharedLimiter` handed to every fetcher spaces requests
//! across all cycles using GCRA with a burst of one.

use crate::error::SchedulerError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::info;

/// Rate limiter shared by every fetcher in the process
pub struct SharedLimiter {
    inner: DefaultDirectRateLimiter,
    period: Duration,
}

impl SharedLimiter {
    /// Allow `requests_per_minute` requests, evenly spaced
    pub fn per_minute(requests_per_minute: NonZeroU32) -> Result<Self, SchedulerError> {
        let period = Duration::from_secs(60) / requests_per_minute.get();
        let quota = Quota::with_period(period)
            .ok_or(SchedulerError::InvalidRate(requests_per_minute.get()))?
            .allow_burst(NonZeroU32::MIN);

        info!(
            "Shared provider limiter: {} requests/min ({:?} spacing)",
            requests_per_minute, period
        );

        Ok(Self {
            inner: RateLimiter::direct(quota),
            period,
        })
    }

    /// Wait until the next request may be sent
    pub async fn acquire(&self) {
        self.inner.until_ready().await;
    }

    /// Take a slot without waiting, if one is free
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }

    /// Minimum spacing between requests
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl fmt::Debug for SharedLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLimiter")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_period() {
        let limiter = SharedLimiter::per_minute(NonZeroU32::new(60).unwrap()).unwrap();
        assert_eq!(limiter.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_burst_of_one() {
        let limiter = SharedLimiter::per_minute(NonZeroU32::new(1).unwrap()).unwrap();
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_acquire_spaces_requests() {
        // 6000/min = one every 10ms
        let limiter = SharedLimiter::per_minute(NonZeroU32::new(6000).unwrap()).unwrap();
        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
