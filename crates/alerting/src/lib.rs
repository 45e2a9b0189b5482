//! Alerting
//!
//! Maps raw weather metrics to one of three severity tiers.

mod classifier;

pub use classifier::{classify, Alert, AlertSummary, AlertThresholds};
