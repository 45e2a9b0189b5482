//! Weather Provider
//!
//! Data model for area observations and an async client for an
//! OpenWeatherMap-compatible current-weather API.

mod client;
mod error;
mod observation;
mod response;

pub use client::{OpenWeatherClient, RequestTemplate, WeatherProvider};
pub use error::ProviderError;
pub use observation::{Observation, ProviderReading, Subdivision, FETCH_ERROR_CONDITION};
pub use response::parse_reading;

/// Default provider endpoint for current conditions
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Default unit system requested from the provider
pub const DEFAULT_UNITS: &str = "metric";
