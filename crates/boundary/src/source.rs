//! Boundary Sources

use crate::error::BoundaryError;
use async_trait::async_trait;
use geojson::{FeatureCollection, GeoJson};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for remote boundary requests
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Somewhere a boundary FeatureCollection can be loaded from
#[async_trait]
pub trait BoundarySource: Send + Sync {
    async fn load(&self) -> Result<Arc<FeatureCollection>, BoundaryError>;

    /// Human-readable location, for logs and health output
    fn describe(&self) -> String;
}

/// Parse a GeoJSON document, requiring a FeatureCollection
pub(crate) fn parse_collection(body: &str) -> Result<FeatureCollection, BoundaryError> {
    match body.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(BoundaryError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => Err(BoundaryError::NotFeatureCollection("Geometry")),
    }
}

/// Boundary data in a local GeoJSON file
#[derive(Debug, Clone)]
pub struct FileBoundarySource {
    path: PathBuf,
}

impl FileBoundarySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl BoundarySource for FileBoundarySource {
    async fn load(&self) -> Result<Arc<FeatureCollection>, BoundaryError> {
        debug!("Loading boundary GeoJSON from {:?}", self.path);
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BoundaryError::Io {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let collection = parse_collection(&body)?;
        debug!("Loaded {} boundary features", collection.features.len());
        Ok(Arc::new(collection))
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Boundary data served over HTTP
#[derive(Debug, Clone)]
pub struct HttpBoundarySource {
    url: String,
    http: reqwest::Client,
}

impl HttpBoundarySource {
    pub fn new(url: impl Into<String>) -> Result<Self, BoundaryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl BoundarySource for HttpBoundarySource {
    async fn load(&self) -> Result<Arc<FeatureCollection>, BoundaryError> {
        debug!("Fetching boundary GeoJSON from {}", self.url);
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoundaryError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let collection = parse_collection(&body)?;
        debug!("Fetched {} boundary features", collection.features.len());
        Ok(Arc::new(collection))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Pick a source for a location string: `http(s)://` URLs are fetched,
/// anything else is read as a file path.
pub fn from_location(location: &str) -> Result<Arc<dyn BoundarySource>, BoundaryError> {
    let source: Arc<dyn BoundarySource> =
        if location.starts_with("http://") || location.starts_with("https://") {
            Arc::new(HttpBoundarySource::new(location)?)
        } else {
            Arc::new(FileBoundarySource::new(location))
        };
    info!("Boundary source: {}", source.describe());
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const TWO_FEATURES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NAME_3": "Barangay 1"},
             "geometry": {"type": "Polygon", "coordinates": [[[120.99,14.55],[121.0,14.55],[121.0,14.56],[120.99,14.55]]]}},
            {"type": "Feature", "properties": {"NAME_3": "Barangay 2"},
             "geometry": {"type": "Polygon", "coordinates": [[[121.0,14.55],[121.01,14.55],[121.01,14.56],[121.0,14.55]]]}}
        ]
    }"#;

    /// Answer one connection with a canned response, returning the base URL
    async fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/geo+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("boundary-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_collection() {
        let collection = parse_collection(TWO_FEATURES).unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn test_parse_rejects_single_feature() {
        let body = r#"{"type": "Feature", "properties": {}, "geometry": null}"#;
        assert!(matches!(
            parse_collection(body),
            Err(BoundaryError::NotFeatureCollection("Feature"))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_collection("not json"),
            Err(BoundaryError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_file_source_loads() {
        let path = temp_path("ok.geojson");
        std::fs::write(&path, TWO_FEATURES).unwrap();

        let source = FileBoundarySource::new(&path);
        let collection = source.load().await.unwrap();
        assert_eq!(collection.features.len(), 2);
        assert!(source.describe().starts_with("file:"));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileBoundarySource::new(temp_path("missing.geojson"));
        assert!(matches!(
            source.load().await,
            Err(BoundaryError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_http_source_unreachable() {
        let source = HttpBoundarySource::new("http://127.0.0.1:9/Pasay.geojson").unwrap();
        assert!(matches!(source.load().await, Err(BoundaryError::Http(_))));
    }

    #[tokio::test]
    async fn test_http_source_loads() {
        let base = serve_once("200 OK", TWO_FEATURES).await;
        let source = HttpBoundarySource::new(format!("{}/Pasay.geojson", base)).unwrap();

        let collection = source.load().await.unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[tokio::test]
    async fn test_http_source_error_status() {
        let base = serve_once("404 Not Found", r#"{"message": "not found"}"#).await;
        let source = HttpBoundarySource::new(format!("{}/Pasay.geojson", base)).unwrap();

        assert!(matches!(source.load().await, Err(BoundaryError::Status(404))));
    }

    #[tokio::test]
    async fn test_http_source_rejects_non_collection() {
        let base = serve_once("200 OK", r#"{"type": "Point", "coordinates": [121.0, 14.5]}"#).await;
        let source = HttpBoundarySource::new(format!("{}/Pasay.geojson", base)).unwrap();

        assert!(matches!(
            source.load().await,
            Err(BoundaryError::NotFeatureCollection(_))
        ));
    }

    #[tokio::test]
    async fn test_http_error_omits_url() {
        let source = HttpBoundarySource::new("http://127.0.0.1:9/Pasay.geojson?token=hunter2").unwrap();
        let message = source.load().await.unwrap_err().to_string();
        assert!(!message.contains("hunter2"), "{}", message);
    }

    #[test]
    fn test_from_location_picks_source() {
        let remote = from_location("https://example.org/Pasay.geojson").unwrap();
        assert_eq!(remote.describe(), "https://example.org/Pasay.geojson");

        let local = from_location("data/pasay.geojson").unwrap();
        assert_eq!(local.describe(), "file:data/pasay.geojson");
    }
}
