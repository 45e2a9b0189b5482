//! Boundary Error Types

use thiserror::Error;

/// Errors loading or annotating boundary geometry
#[derive(Debug, Clone, Error)]
pub enum BoundaryError {
    /// File could not be read
    #[error("Failed to read boundary file {path}: {reason}")]
    Io { path: String, reason: String },

    /// Request to the boundary URL failed
    #[error("Failed to fetch boundary data: {0}")]
    Http(String),

    /// Boundary URL answered with a non-success status
    #[error("Boundary source responded with status {0}")]
    Status(u16),

    /// Body was not valid GeoJSON
    #[error("Invalid GeoJSON: {0}")]
    Parse(String),

    /// GeoJSON was valid but not a FeatureCollection
    #[error("Boundary data must be a FeatureCollection, got {0}")]
    NotFeatureCollection(&'static str),

    /// Observation could not be encoded into a feature property
    #[error("Failed to encode weather property: {0}")]
    Encode(String),
}

impl From<reqwest::Error> for BoundaryError {
    fn from(err: reqwest::Error) -> Self {
        BoundaryError::Http(err.without_url().to_string())
    }
}

impl From<geojson::Error> for BoundaryError {
    fn from(err: geojson::Error) -> Self {
        BoundaryError::Parse(err.to_string())
    }
}
