//! Per-subdivision fetch results

use weather_provider::{Observation, ProviderError};

/// Result of polling one subdivision
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Observation built from a provider response
    Live(Observation),
    /// Provider request failed; observation is the fallback placeholder
    Fallback {
        observation: Observation,
        error: ProviderError,
    },
}

impl FetchOutcome {
    pub fn observation(&self) -> &Observation {
        match self {
            FetchOutcome::Live(observation) => observation,
            FetchOutcome::Fallback { observation, .. } => observation,
        }
    }

    pub fn into_observation(self) -> Observation {
        match self {
            FetchOutcome::Live(observation) => observation,
            FetchOutcome::Fallback { observation, .. } => observation,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            FetchOutcome::Live(_) => None,
            FetchOutcome::Fallback { error, .. } => Some(error),
        }
    }
}

/// Strip the tags, keeping order
pub fn into_observations(outcomes: Vec<FetchOutcome>) -> Vec<Observation> {
    outcomes
        .into_iter()
        .map(FetchOutcome::into_observation)
        .collect()
}
