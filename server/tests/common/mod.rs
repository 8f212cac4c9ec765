//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
};
use overlay_server::config::UploadConfig;
use overlay_server::{AppState, SledOverlayStore, UploadService, router};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_BASE_URL: &str = "http://127.0.0.1:5000";
const BOUNDARY: &str = "----overlay-test-boundary";

/// A fully wired router over a temporary store and upload directory
pub struct TestApp {
    pub router: Router,
    pub store: Arc<SledOverlayStore>,
    /// Kept alive for the duration of the test
    pub uploads_dir: TempDir,
}

/// Create a test application with all routes configured
pub fn create_test_app() -> TestApp {
    build_test_app(None)
}

/// Create a test application whose upload endpoint caps request bodies at
/// `limit` bytes
#[allow(dead_code)]
pub fn create_test_app_with_limit(limit: usize) -> TestApp {
    build_test_app(Some(limit))
}

fn build_test_app(max_upload_size: Option<usize>) -> TestApp {
    let uploads_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledOverlayStore::temporary().unwrap());

    let config = UploadConfig {
        uploads_dir: uploads_dir.path().to_path_buf(),
        max_upload_size,
    };
    let uploads = Arc::new(UploadService::new(&config, TEST_BASE_URL).unwrap());

    let state = AppState::new(store.clone(), uploads).with_max_upload_size(max_upload_size);
    let router = router(state);

    TestApp {
        router,
        store,
        uploads_dir,
    }
}

impl TestApp {
    /// Send a request and collect the status and body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body)
    }

    /// Send a request and decode the body as JSON
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(request).await;
        let json = serde_json::from_slice(&body).unwrap();
        (status, json)
    }
}

/// Build a request with a JSON body
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request with a raw body and no content type
pub fn raw_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a multipart upload request with a single field.
///
/// `filename: None` sends a plain form value instead of a file.
pub fn multipart_request(field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Path component of a URL returned by the upload endpoint
pub fn path_of(url: &str) -> &str {
    url.strip_prefix(TEST_BASE_URL)
        .expect("upload URL should use the test base URL")
}

/// Initialize test logging for detailed output
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overlay_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
