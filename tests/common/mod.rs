//! Shared helpers for integration tests: an in-process application built
//! the same way `main` builds it, plus canned colorizers and request
//! plumbing.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use sar_colorize_hw::app_state::AppState;
use sar_colorize_hw::routes;
use sar_colorize_hw::services::gateway::{ColorizeClient, Colorizer, GatewayError, ModelProtocol};
use sar_colorize_hw::services::storage::ImageStore;
use sar_colorize_hw::services::tracker::JobTracker;

/// Colorizer that replies immediately with fixed bytes.
pub struct StubColorizer(pub Vec<u8>);

#[async_trait]
impl Colorizer for StubColorizer {
    async fn colorize(&self, _image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        Ok(self.0.clone())
    }
}

/// Colorizer that always fails.
pub struct FailingColorizer;

#[async_trait]
impl Colorizer for FailingColorizer {
    async fn colorize(&self, _image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        Err(GatewayError::InvalidResponse)
    }
}

/// Colorizer that never answers, leaving jobs in processing until the test
/// drives an outcome through the tracker itself.
pub struct PendingColorizer;

#[async_trait]
impl Colorizer for PendingColorizer {
    async fn colorize(&self, _image: &[u8]) -> Result<Vec<u8>, GatewayError> {
        std::future::pending().await
    }
}

/// Everything a test needs to drive the service in-process.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _processed_dir: TempDir,
}

/// Build the application (router plus state) against a temp image store
/// and the given colorizer, mirroring the construction in `main`.
pub async fn build_test_app(colorizer: Arc<dyn Colorizer>, job_timeout: chrono::Duration) -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let storage = Arc::new(
        ImageStore::init(dir.path())
            .await
            .expect("init image store"),
    );
    // Points at a closed port; only the health endpoint ever dials it.
    let gateway = Arc::new(
        ColorizeClient::new(
            "http://127.0.0.1:9",
            ModelProtocol::Multipart,
            Duration::from_secs(1),
        )
        .expect("build model client"),
    );
    let tracker = Arc::new(JobTracker::new(Arc::clone(&storage), colorizer, job_timeout));
    let state = AppState::new(tracker, gateway, storage);
    let app = routes::api_router(state.clone());

    TestApp {
        app,
        state,
        _processed_dir: dir,
    }
}

/// Issue a GET against the app.
pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("build request"),
    )
    .await
    .expect("request failed")
}

/// Issue an arbitrary request against the app.
pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request failed")
}

/// Read a JSON response body into a `serde_json::Value`.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is valid JSON")
}

/// Read a raw response body.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

/// Encode a single-file multipart POST with the given field name.
pub fn multipart_request(path: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "sar-colorize-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("build multipart request")
}

/// Poll the status endpoint until the job leaves `processing`, or panic
/// after roughly two seconds.
pub async fn wait_for_terminal(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let response = get(app.clone(), &format!("/api/status/{job_id}")).await;
        let json = body_json(response).await;
        if json["status"] != "processing" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {job_id} never reached a terminal state");
}

/// A tiny valid grayscale PNG generated in memory.
pub fn sample_png() -> Vec<u8> {
    encode_png(image::DynamicImage::ImageLuma8(
        image::GrayImage::from_pixel(4, 4, image::Luma([128u8])),
    ))
}

/// A distinct RGB PNG, distinguishable from `sample_png` output.
pub fn colorized_png() -> Vec<u8> {
    encode_png(image::DynamicImage::ImageRgb8(
        image::RgbImage::from_pixel(4, 4, image::Rgb([200u8, 60, 60])),
    ))
}

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
