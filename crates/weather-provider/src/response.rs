//! Provider Response Decoding
//!
//! Every sub-object and field of the current-weather payload is optional.
//! Absent or null values decode as zero, an absent description as "Unknown".

use crate::error::ProviderError;
use crate::observation::ProviderReading;
use serde::Deserialize;

const UNKNOWN_CONDITION: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
struct CurrentWeather {
    main: Option<MainBlock>,
    wind: Option<WindBlock>,
    weather: Option<Vec<ConditionBlock>>,
    rain: Option<RainBlock>,
    /// Metres
    visibility: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl From<CurrentWeather> for ProviderReading {
    fn from(raw: CurrentWeather) -> Self {
        let main = raw.main.unwrap_or_default();
        let wind = raw.wind.unwrap_or_default();

        let condition = raw
            .weather
            .and_then(|conditions| conditions.into_iter().next())
            .and_then(|c| c.description)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

        Self {
            condition,
            temperature: main.temp.unwrap_or(0.0),
            humidity: main.humidity.unwrap_or(0.0),
            wind_speed: wind.speed.unwrap_or(0.0),
            visibility_km: raw.visibility.map(|m| m / 1000.0).unwrap_or(0.0),
            precipitation: raw.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
        }
    }
}

/// Decode a current-weather JSON body into a reading
pub fn parse_reading(body: &str) -> Result<ProviderReading, ProviderError> {
    let raw: CurrentWeather = serde_json::from_str(body)?;
    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload() {
        let body = r#"{
            "coord": {"lon": 121.0014, "lat": 14.5378},
            "weather": [{"id": 502, "main": "Rain", "description": "heavy intensity rain"}],
            "main": {"temp": 26.4, "feels_like": 29.1, "humidity": 93},
            "visibility": 6000,
            "wind": {"speed": 9.3, "deg": 230},
            "rain": {"1h": 17.2},
            "name": "Pasay"
        }"#;

        let reading = parse_reading(body).unwrap();
        assert_eq!(reading.condition, "heavy intensity rain");
        assert_eq!(reading.temperature, 26.4);
        assert_eq!(reading.humidity, 93.0);
        assert_eq!(reading.wind_speed, 9.3);
        assert_eq!(reading.visibility_km, 6.0);
        assert_eq!(reading.precipitation, 17.2);
    }

    #[test]
    fn test_missing_blocks_default_to_zero() {
        let reading = parse_reading("{}").unwrap();
        assert_eq!(reading.condition, "Unknown");
        assert_eq!(reading.temperature, 0.0);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.wind_speed, 0.0);
        assert_eq!(reading.visibility_km, 0.0);
        assert_eq!(reading.precipitation, 0.0);
    }

    #[test]
    fn test_null_and_empty_fields() {
        let body = r#"{"main": null, "wind": {}, "weather": [], "rain": {"3h": 4.0}}"#;
        let reading = parse_reading(body).unwrap();
        assert_eq!(reading.condition, "Unknown");
        assert_eq!(reading.wind_speed, 0.0);
        assert_eq!(reading.precipitation, 0.0);

        let body = r#"{"weather": [{"description": ""}]}"#;
        assert_eq!(parse_reading(body).unwrap().condition, "Unknown");
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_reading("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }
}
