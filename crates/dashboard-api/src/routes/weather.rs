//! Weather Routes

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use weather_provider::{Observation, Subdivision};

use crate::aggregation::CombinedResult;
use crate::error::ApiError;
use crate::AppState;

/// Label used when a point request has no `area`
const DEFAULT_POINT_LABEL: &str = "Requested location";

/// Query parameters for the point endpoint
#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Label echoed back as `area`
    pub area: Option<String>,
}

/// Aggregate weather for every configured subdivision.
///
/// The cycle runs on its own task and finishes even if the caller goes away.
pub async fn get_area_weather(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CombinedResult>, ApiError> {
    let task_state = Arc::clone(&state);
    let report = tokio::spawn(async move {
        task_state
            .aggregator
            .aggregate(&task_state.subdivisions)
            .await
    })
    .await
    .map_err(|e| ApiError::Internal(format!("aggregation task failed: {}", e)))??;

    Ok(Json(report.combined))
}

/// Current weather for one coordinate
pub async fn get_point_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQuery>,
) -> Result<Json<Observation>, ApiError> {
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return Err(ApiError::BadRequest("Missing lat/lon".to_string()));
    };

    let label = params
        .area
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_POINT_LABEL.to_string());

    let observation = state
        .aggregator
        .observe_point(&Subdivision::new(label, lat, lon))
        .await?;

    Ok(Json(observation))
}
