//! Scheduler Error Types

use thiserror::Error;

/// Errors building a fetcher or limiter
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// Request cap must be at least one per minute
    #[error("Invalid request cap: {0} requests per minute")]
    InvalidRate(u32),
}
