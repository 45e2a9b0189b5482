//! Rate-Limited Weather Fetcher
//!
//! Polls the weather provider once per subdivision, strictly in sequence,
//! with a fixed delay between requests derived from the provider's
//! requests-per-minute cap. Per-item failures become fallback observations.

mod config;
mod error;
mod fetcher;
mod limiter;
mod outcome;

pub use config::FetcherConfig;
pub use error::SchedulerError;
pub use fetcher::RateLimitedFetcher;
pub use limiter::SharedLimiter;
pub use outcome::{into_observations, FetchOutcome};
