//! Boundary Geometry
//!
//! Loads the subdivision boundary FeatureCollection from a file or URL,
//! optionally caches it for the life of the process, and annotates each
//! feature with the weather observation of the matching subdivision.

mod cache;
mod error;
mod merge;
mod source;

pub use cache::CachedBoundarySource;
pub use error::BoundaryError;
pub use merge::{merge_weather, WeatherIndex, WEATHER_PROPERTY};
pub use source::{from_location, BoundarySource, FileBoundarySource, HttpBoundarySource};

/// Property holding the subdivision name in the municipal boundary dataset
pub const DEFAULT_NAME_PROPERTY: &str = "NAME_3";
