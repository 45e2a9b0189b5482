//! Weather annotation of boundary features

use crate::error::BoundaryError;
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::Value;
use std::collections::HashMap;
use weather_provider::Observation;

/// Property added to every feature by [`merge_weather`]
pub const WEATHER_PROPERTY: &str = "weather";

/// Observations keyed by exact subdivision name, pre-encoded as JSON.
///
/// When two observations share a name the first one is kept.
#[derive(Debug, Default)]
pub struct WeatherIndex<'a> {
    by_name: HashMap<&'a str, Value>,
}

impl<'a> WeatherIndex<'a> {
    pub fn build(observations: &'a [Observation]) -> Result<Self, BoundaryError> {
        let mut by_name = HashMap::with_capacity(observations.len());
        for observation in observations {
            if by_name.contains_key(observation.subdivision_name.as_str()) {
                continue;
            }
            let encoded = serde_json::to_value(observation)
                .map_err(|e| BoundaryError::Encode(e.to_string()))?;
            by_name.insert(observation.subdivision_name.as_str(), encoded);
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Return a copy of `collection` with a `weather` property on every feature.
///
/// The value is the observation whose subdivision name equals the feature's
/// `name_property` (case-sensitive), or `null` when none matches or the
/// feature has no string name. Feature count and order are preserved and the
/// input is left untouched.
pub fn merge_weather(
    collection: &FeatureCollection,
    observations: &[Observation],
    name_property: &str,
) -> Result<FeatureCollection, BoundaryError> {
    let index = WeatherIndex::build(observations)?;

    let features = collection
        .features
        .iter()
        .map(|feature| annotate(feature, &index, name_property))
        .collect();

    Ok(FeatureCollection {
        bbox: collection.bbox.clone(),
        features,
        foreign_members: collection.foreign_members.clone(),
    })
}

fn annotate(feature: &Feature, index: &WeatherIndex<'_>, name_property: &str) -> Feature {
    let mut properties: JsonObject = feature.properties.clone().unwrap_or_default();

    let weather = properties
        .get(name_property)
        .and_then(Value::as_str)
        .and_then(|name| index.get(name))
        .cloned()
        .unwrap_or(Value::Null);
    properties.insert(WEATHER_PROPERTY.to_string(), weather);

    Feature {
        properties: Some(properties),
        ..feature.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::Alert;
    use weather_provider::Subdivision;

    fn collection(names: &[Option<&str>]) -> FeatureCollection {
        let features = names
            .iter()
            .map(|name| {
                let mut properties = JsonObject::new();
                properties.insert("GID_3".to_string(), Value::from("PHL.47.2.1_1"));
                if let Some(name) = name {
                    properties.insert("NAME_3".to_string(), Value::from(*name));
                }
                Feature {
                    bbox: None,
                    geometry: None,
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn observation(name: &str, temp: f64) -> Observation {
        let mut obs = Observation::fallback(&Subdivision::new(name, 14.5, 121.0));
        obs.condition = "clear sky".to_string();
        obs.temperature = temp;
        obs.alert = Alert::Safe;
        obs
    }

    fn weather_of(feature: &Feature) -> &Value {
        feature
            .properties
            .as_ref()
            .and_then(|p| p.get(WEATHER_PROPERTY))
            .expect("weather key present")
    }

    #[test]
    fn test_every_feature_gets_weather_key() {
        let input = collection(&[Some("Barangay 1"), Some("Barangay 2"), None]);
        let observations = vec![observation("Barangay 1", 28.0)];

        let merged = merge_weather(&input, &observations, "NAME_3").unwrap();

        assert_eq!(merged.features.len(), 3);
        assert_eq!(weather_of(&merged.features[0])["area"], "Barangay 1");
        assert_eq!(weather_of(&merged.features[0])["temp"], 28.0);
        assert!(weather_of(&merged.features[1]).is_null());
        assert!(weather_of(&merged.features[2]).is_null());
    }

    #[test]
    fn test_unmatched_name_is_null() {
        let input = collection(&[Some("Barangay 183")]);
        let merged =
            merge_weather(&input, &[observation("Barangay 1", 28.0)], "NAME_3").unwrap();
        assert!(weather_of(&merged.features[0]).is_null());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let input = collection(&[Some("barangay 1")]);
        let merged =
            merge_weather(&input, &[observation("Barangay 1", 28.0)], "NAME_3").unwrap();
        assert!(weather_of(&merged.features[0]).is_null());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let input = collection(&[Some("Barangay 1")]);
        let observations = vec![observation("Barangay 1", 28.0), observation("Barangay 1", 31.0)];
        let merged = merge_weather(&input, &observations, "NAME_3").unwrap();
        assert_eq!(weather_of(&merged.features[0])["temp"], 28.0);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = collection(&[Some("Barangay 1"), Some("Barangay 2")]);
        let before = input.clone();

        let merged =
            merge_weather(&input, &[observation("Barangay 2", 30.0)], "NAME_3").unwrap();

        assert_eq!(input, before);
        assert_ne!(merged, before);
        // Other properties survive
        let props = merged.features[1].properties.as_ref().unwrap();
        assert_eq!(props["GID_3"], "PHL.47.2.1_1");
        assert_eq!(props["NAME_3"], "Barangay 2");
    }

    #[test]
    fn test_feature_without_properties() {
        let input = FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: None,
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        };
        let merged = merge_weather(&input, &[], "NAME_3").unwrap();
        let props = merged.features[0].properties.as_ref().unwrap();
        assert_eq!(props.len(), 1);
        assert!(props[WEATHER_PROPERTY].is_null());
    }

    #[test]
    fn test_custom_name_property() {
        let input = collection(&[Some("Barangay 1")]);
        let merged =
            merge_weather(&input, &[observation("PHL.47.2.1_1", 26.0)], "GID_3").unwrap();
        assert_eq!(weather_of(&merged.features[0])["temp"], 26.0);
    }

    #[test]
    fn test_index() {
        let observations = vec![observation("A", 1.0), observation("B", 2.0), observation("A", 3.0)];
        let index = WeatherIndex::build(&observations).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get("C").is_none());
        assert!(WeatherIndex::build(&[]).unwrap().is_empty());
    }
}
