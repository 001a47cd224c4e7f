//! Shared test utilities for HTTP API tests
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::{Method, Request, StatusCode};
use tempfile::TempDir;
use tower::ServiceExt;

use common::prelude::Kvest;
use kvest_daemon::http_server;
use kvest_daemon::ServiceState;

pub const ADMIN_KEY: &str = "test-master-key";

pub struct TestApp {
    pub router: Router,
    pub kvest: Arc<Kvest>,
    _temp: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn msg(&self) -> String {
        self.json()["msg"].as_str().unwrap().to_string()
    }
}

/// Build the full router over a fresh data directory with a known admin key
pub fn setup() -> TestApp {
    setup_with_admin_key(Some(ADMIN_KEY))
}

pub fn setup_with_admin_key(admin_key: Option<&str>) -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let temp = TempDir::new().unwrap();
    let kvest = Arc::new(
        Kvest::open(temp.path().join("data"), admin_key.map(str::to_string)).unwrap(),
    );
    let router = http_server::router(ServiceState::new(kvest.clone()));
    TestApp {
        router,
        kvest,
        _temp: temp,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> TestResponse {
        let mut request = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            content_type,
            body,
        }
    }

    /// Send a tenant request authenticated with `api_key`
    pub async fn tenant(&self, method: Method, uri: &str, api_key: &str, body: &str) -> TestResponse {
        self.send(method, uri, &[("API-KEY", api_key)], body).await
    }

    /// Send an admin request with the test admin key
    pub async fn admin(&self, path: &str, name: &str) -> TestResponse {
        let body = serde_json::json!({ "name": name }).to_string();
        self.send(Method::PUT, path, &[("MASTER-API-KEY", ADMIN_KEY)], &body)
            .await
    }

    /// Provision a tenant over HTTP and return its API key
    pub async fn provision(&self, name: &str) -> String {
        let response = self.admin("/admin/create_kv", name).await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["api_key"].as_str().unwrap().to_string()
    }
}
