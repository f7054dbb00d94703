//! In-process test harness: the full router over in-memory store, publisher
//! and a scripted AI client.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use recipe_core::ai::FakeAiClient;
use recipe_core::publish::{MemoryPublisher, RetryPolicy};
use recipe_core::{MemoryStore, MockFetcher, RecipeGenerator, RecipeStore, User};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::auth::{PRINCIPAL_ID_HEADER, PRINCIPAL_IDP_HEADER, PRINCIPAL_NAME_HEADER};
use crate::config::ServerConfig;
use crate::{build_app, AppState};

pub const TEST_PAGE_URL: &str = "https://example.com/tomato-soup";

pub struct TestApp {
    pub ai: Arc<FakeAiClient>,
    pub store: Arc<MemoryStore>,
    pub publisher: Arc<MemoryPublisher>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_ai(FakeAiClient::with_recipe_responses())
    }

    pub fn with_ai(ai: FakeAiClient) -> Self {
        let ai = Arc::new(ai);
        let store = Arc::new(MemoryStore::new());
        let publisher = Arc::new(MemoryPublisher::new());
        let fetcher = MockFetcher::new().with_page(
            TEST_PAGE_URL,
            "<h1>Tomato soup</h1><p>800 g tomatoes, 1 onion</p>",
        );

        let config = ServerConfig {
            database_url: String::new(),
            bind_addr: "127.0.0.1:0".to_string(),
            local_dev: false,
            judge_enabled: true,
            bootstrap_retry: RetryPolicy {
                max_attempts: 5,
                delay: Duration::ZERO,
            },
        };

        let state = AppState {
            store: store.clone(),
            ai: ai.clone(),
            generator: Arc::new(RecipeGenerator::new(
                ai.clone(),
                Arc::new(fetcher),
                config.judge_enabled,
            )),
            publisher: publisher.clone(),
            config: Arc::new(config),
        };

        Self {
            ai,
            store,
            publisher,
            router: build_app(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in as `oauth_id`, registering on first use.
    pub async fn login(&self, oauth_id: &str) -> User {
        let mut request = Request::builder().method("POST").uri("/api/v1/login");
        for (name, value) in principal_headers(oauth_id) {
            request = request.header(name, value);
        }
        let response = self.send(request.body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        self.store.find_user(oauth_id).await.unwrap().unwrap()
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        oauth_id: Option<&str>,
    ) -> Response {
        self.send(json_request("POST", uri, body, oauth_id)).await
    }
}

/// Platform identity headers for `oauth_id`.
pub fn principal_headers(oauth_id: &str) -> [(&'static str, String); 3] {
    [
        (PRINCIPAL_ID_HEADER, oauth_id.to_string()),
        (PRINCIPAL_NAME_HEADER, format!("{oauth_id}@example.com")),
        (PRINCIPAL_IDP_HEADER, "aad".to_string()),
    ]
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    oauth_id: Option<&str>,
) -> Request<Body> {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(oauth_id) = oauth_id {
        for (name, value) in principal_headers(oauth_id) {
            request = request.header(name, value);
        }
    }
    request.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, oauth_id: &str) -> Request<Body> {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in principal_headers(oauth_id) {
        request = request.header(name, value);
    }
    request.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "----recipe-test-boundary";

/// Builder for multipart/form-data request bodies.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
