//! Health Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub pipeline: PipelineInfo,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub provider: ComponentHealth,
    pub boundary: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub detail: Option<String>,
}

/// Static facts about the aggregation cycle
#[derive(Debug, Serialize)]
pub struct PipelineInfo {
    pub subdivision_count: usize,
    pub max_requests_per_minute: u32,
    pub request_delay_ms: u64,
    pub shared_limiter: bool,
}

/// Health check handler. Makes no provider or boundary requests.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let aggregator = &state.aggregator;
    let configured = aggregator.is_configured();
    let fetcher = &aggregator.config().fetcher;

    Json(HealthResponse {
        status: if configured { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            provider: ComponentHealth {
                status: if configured { "ok" } else { "missing_api_key" }.to_string(),
                detail: Some(aggregator.config().base_url.clone()),
            },
            boundary: ComponentHealth {
                status: "ok".to_string(),
                detail: Some(aggregator.boundary_source()),
            },
        },
        pipeline: PipelineInfo {
            subdivision_count: state.subdivisions.len(),
            max_requests_per_minute: fetcher.max_requests_per_minute.get(),
            request_delay_ms: u64::try_from(fetcher.delay().as_millis()).unwrap_or(u64::MAX),
            shared_limiter: aggregator.has_shared_limiter(),
        },
    })
}
