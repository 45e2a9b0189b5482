//! Area Weather Dashboard - Main Entry Point

use dashboard_api::{init_logging, run_server, AppState, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_logging(&settings.log)?;

    info!("=== Area Weather Dashboard v{} ===", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::from_settings(&settings)?;
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Metrics disabled: {}", e),
    }

    run_server(Arc::new(state), &settings).await?;

    Ok(())
}
