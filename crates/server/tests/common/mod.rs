//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a scripted acquirer injected, so no acquisition tool is needed.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use musify_core::testing::MockAcquirer;
use musify_core::{Config, JobRecord, ZipPackager};
use musify_server::state::AppState;

/// Re-export fixtures for test convenience
pub use musify_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/download", json!({
///         "url": fixtures::PLAYLIST_URL
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock acquirer - script provider outcomes
    pub acquirer: Arc<MockAcquirer>,
    /// Temporary directory holding downloads and archives
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default providers.
    pub fn new() -> Self {
        Self::with_providers(&["youtube-music", "youtube"])
    }

    /// Create a test fixture with the given provider list.
    pub fn with_providers(providers: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.storage = fixtures::storage_in(temp_dir.path());
        config.acquisition.providers = providers.iter().map(|p| p.to_string()).collect();
        config.publisher.poll_interval_ms = 10;

        let acquirer = Arc::new(MockAcquirer::new());
        let state = Arc::new(AppState::with_components(
            config,
            Arc::clone(&acquirer) as Arc<dyn musify_core::Acquirer>,
            Arc::new(ZipPackager::new()),
        ));

        // Create router
        let router = musify_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            acquirer,
            temp_dir,
        }
    }

    /// Submit a URL and return the job id.
    pub async fn submit(&self, url: &str) -> String {
        let response = self
            .post("/api/download", serde_json::json!({ "url": url }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "submit failed: {:?}", response.body);
        response.body["job_id"]
            .as_str()
            .expect("job_id in response")
            .to_string()
    }

    /// Wait until the job is terminal.
    pub async fn wait_for_terminal(&self, job_id: &str) -> JobRecord {
        fixtures::wait_for_terminal(
            self.state.orchestrator().store().as_ref(),
            job_id,
            Duration::from_secs(5),
        )
        .await
        .expect("job did not finish in time")
    }

    /// Serve the router on an ephemeral local port.
    ///
    /// The server task lives until the test's runtime shuts down.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        addr
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}
