//! Alert Tier Classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alert {
    Safe,
    Warning,
    Critical,
}

impl Alert {
    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Alert::Safe => "safe",
            Alert::Warning => "warning",
            Alert::Critical => "critical",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds for the tier rule. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Precipitation above which an area is critical (mm/h)
    pub critical_precipitation: f64,
    /// Wind speed above which an area is critical
    pub critical_wind: f64,
    /// Precipitation above which an area is at least a warning (mm/h)
    pub warning_precipitation: f64,
    /// Wind speed above which an area is at least a warning
    pub warning_wind: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            critical_precipitation: 20.0,
            critical_wind: 40.0,
            warning_precipitation: 5.0,
            warning_wind: 20.0,
        }
    }
}

impl AlertThresholds {
    /// Classify precipitation (mm/h) and wind speed into a tier.
    ///
    /// The first matching rule wins: critical, then warning, then safe.
    /// Values exactly on a threshold fall through to the less severe tier,
    /// and NaN compares false everywhere so it lands on `Safe`.
    pub fn classify(&self, precipitation: f64, wind_speed: f64) -> Alert {
        if precipitation > self.critical_precipitation || wind_speed > self.critical_wind {
            Alert::Critical
        } else if precipitation > self.warning_precipitation || wind_speed > self.warning_wind {
            Alert::Warning
        } else {
            Alert::Safe
        }
    }
}

/// Classify with the default thresholds
pub fn classify(precipitation: f64, wind_speed: f64) -> Alert {
    AlertThresholds::default().classify(precipitation, wind_speed)
}

/// Count of areas per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub critical: usize,
    pub warning: usize,
    pub safe: usize,
}

impl AlertSummary {
    /// Tally a sequence of tiers
    pub fn from_alerts<I>(alerts: I) -> Self
    where
        I: IntoIterator<Item = Alert>,
    {
        alerts.into_iter().fold(Self::default(), |mut summary, alert| {
            match alert {
                Alert::Critical => summary.critical += 1,
                Alert::Warning => summary.warning += 1,
                Alert::Safe => summary.safe += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.safe
    }

    /// Most severe tier present, if any
    pub fn highest(&self) -> Option<Alert> {
        if self.critical > 0 {
            Some(Alert::Critical)
        } else if self.warning > 0 {
            Some(Alert::Warning)
        } else if self.safe > 0 {
            Some(Alert::Safe)
        } else {
            None
        }
    }
}
