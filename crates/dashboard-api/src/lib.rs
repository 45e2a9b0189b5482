//! Area Weather Dashboard API Server
//!
//! Serves aggregated per-subdivision weather, merged with boundary polygons,
//! to the municipal dashboard.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use boundary::{BoundarySource, CachedBoundarySource};
use fetch_scheduler::SharedLimiter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use weather_provider::{OpenWeatherClient, Subdivision};

pub mod aggregation;
pub mod error;
pub mod rate_limit;
pub mod routes;
pub mod settings;

pub use aggregation::{
    AggregationError, Aggregator, AggregatorConfig, CombinedResult, CycleReport, Phase,
};
pub use error::{ApiError, StartupError};
pub use settings::{LogSettings, Settings, SettingsError};

/// Application state shared across handlers
pub struct AppState {
    pub aggregator: Aggregator,
    /// Polled in this order every cycle
    pub subdivisions: Arc<[Subdivision]>,
    pub version: String,
    pub start_time: std::time::Instant,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(aggregator: Aggregator, subdivisions: Vec<Subdivision>) -> Self {
        Self {
            aggregator,
            subdivisions: subdivisions.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Wire the real provider client and boundary source from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        for notice in settings.notices() {
            warn!("{}", notice);
        }

        let provider = Arc::new(OpenWeatherClient::with_timeout(Duration::from_secs(
            settings.provider.timeout_secs,
        ))?);

        let source = boundary::from_location(&settings.boundary.location)?;
        let boundary: Arc<dyn BoundarySource> = if settings.boundary.cache {
            Arc::new(CachedBoundarySource::new(source))
        } else {
            source
        };

        let mut aggregator = Aggregator::new(provider, boundary, settings.aggregator_config()?);

        if settings.provider.shared_limiter {
            let cap = NonZeroU32::new(settings.provider.max_requests_per_minute).ok_or(
                fetch_scheduler::SchedulerError::InvalidRate(settings.provider.max_requests_per_minute),
            )?;
            aggregator = aggregator.with_shared_limiter(Arc::new(SharedLimiter::per_minute(cap)?));
        }

        info!(
            "Monitoring {} subdivisions, {:?} between provider requests",
            settings.subdivisions.len(),
            aggregator.config().fetcher.delay()
        );

        Ok(Self::new(aggregator, settings.subdivisions.clone()))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health_handler))
        .route("/api/psa-barangays", get(routes::weather::get_area_weather))
        .route("/api/weather", get(routes::weather::get_point_weather))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LogSettings) -> Result<(), StartupError> {
    let level: Level = settings
        .level
        .parse()
        .map_err(|e| StartupError::Logging(format!("{}: {}", settings.level, e)))?;

    let result = if settings.json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| StartupError::Logging(e.to_string()))
}

/// Run the server with per-IP rate limiting
pub async fn run_server(state: Arc<AppState>, settings: &Settings) -> Result<(), StartupError> {
    let governor = rate_limit::create_governor_config(&settings.rate_limit_config()).ok_or(
        SettingsError::Invalid {
            key: "rate_limit",
            reason: "per_second and burst_size must be non-zero".to_string(),
        },
    )?;

    let app = create_router(state).layer(GovernorLayer { config: governor });

    info!("Starting API server on {}", settings.server.addr);

    let listener = tokio::net::TcpListener::bind(&settings.server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
