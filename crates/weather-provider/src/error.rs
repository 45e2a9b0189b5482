//! Provider Error Types

use thiserror::Error;

/// Errors from a single provider request
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Provider responded with status {status}")]
    Status { status: u16 },

    /// Provider answered 429
    #[error("Provider throttled the request (retry after {retry_after:?}s)")]
    Throttled { retry_after: Option<u64> },

    /// Body was not the expected JSON
    #[error("Invalid provider response: {0}")]
    Decode(String),

    /// Client could not be constructed
    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl ProviderError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, ProviderError::Throttled { .. })
    }
}

/// The request URL carries the API key, so it never reaches the message
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}
