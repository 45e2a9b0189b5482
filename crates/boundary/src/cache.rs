//! Process-wide boundary cache

use crate::error::BoundaryError;
use crate::source::BoundarySource;
use async_trait::async_trait;
use geojson::FeatureCollection;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Loads the wrapped source once and serves the same collection afterwards.
///
/// Concurrent first callers share a single load. A failed load leaves the
/// cache empty so the next caller tries again.
pub struct CachedBoundarySource {
    inner: Arc<dyn BoundarySource>,
    cell: OnceCell<Arc<FeatureCollection>>,
}

impl CachedBoundarySource {
    pub fn new(inner: Arc<dyn BoundarySource>) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl BoundarySource for CachedBoundarySource {
    async fn load(&self) -> Result<Arc<FeatureCollection>, BoundaryError> {
        let collection = self
            .cell
            .get_or_try_init(|| async {
                match self.inner.load().await {
                    Ok(collection) => {
                        info!(
                            "Cached {} boundary features from {}",
                            collection.features.len(),
                            self.inner.describe()
                        );
                        Ok(collection)
                    }
                    Err(e) => {
                        warn!("Boundary cache fill failed: {}", e);
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(collection))
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}
