//! Subdivisions and Observations

use alerting::{Alert, AlertThresholds};
use serde::{Deserialize, Serialize};

/// Condition text carried by a fallback observation
pub const FETCH_ERROR_CONDITION: &str = "Fetch Error";

/// A monitored area and its representative coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Subdivision {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

/// Metrics parsed from one provider response, before classification
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderReading {
    pub condition: String,
    /// Temperature in the requested unit system
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    pub wind_speed: f64,
    /// Visibility (km)
    pub visibility_km: f64,
    /// Rain over the last hour (mm/h)
    pub precipitation: f64,
}

/// Weather snapshot for one subdivision in one aggregation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "area")]
    pub subdivision_name: String,
    pub lat: f64,
    pub lon: f64,
    pub condition: String,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub humidity: f64,
    #[serde(rename = "windSpeed")]
    pub wind_speed: f64,
    pub visibility: f64,
    pub alert: Alert,
}

impl Observation {
    /// Build a classified observation from provider metrics
    pub fn from_reading(
        subdivision: &Subdivision,
        reading: &ProviderReading,
        thresholds: &AlertThresholds,
    ) -> Self {
        Self {
            subdivision_name: subdivision.name.clone(),
            lat: subdivision.lat,
            lon: subdivision.lon,
            condition: reading.condition.clone(),
            temperature: reading.temperature,
            humidity: reading.humidity,
            wind_speed: reading.wind_speed,
            visibility: reading.visibility_km,
            alert: thresholds.classify(reading.precipitation, reading.wind_speed),
        }
    }

    /// Placeholder for a subdivision whose request failed.
    ///
    /// Numeric metrics are zeroed and the tier is pinned to `Warning` so the
    /// area is never shown as safe when its state is unknown.
    pub fn fallback(subdivision: &Subdivision) -> Self {
        Self {
            subdivision_name: subdivision.name.clone(),
            lat: subdivision.lat,
            lon: subdivision.lon,
            condition: FETCH_ERROR_CONDITION.to_string(),
            temperature: 0.0,
            humidity: 0.0,
            wind_speed: 0.0,
            visibility: 0.0,
            alert: Alert::Warning,
        }
    }
}
