//! 集成测试公共工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

use command_center::{build_router, AppState, EnvConfig};

/// 一个不会有服务监听的地址
pub const DEAD_N8N: &str = "http://127.0.0.1:9";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    /// 持有临时目录直到测试结束
    pub data_dir: TempDir,
}

impl TestApp {
    pub async fn new(n8n_url: &str) -> Self {
        Self::with_config(n8n_url, |_| {}).await
    }

    pub async fn with_config(n8n_url: &str, customize: impl FnOnce(&mut EnvConfig)) -> Self {
        let data_dir = tempfile::tempdir().expect("tempdir");
        let mut config = EnvConfig::new(n8n_url, data_dir.path());
        config.timeout_secs = 5;
        customize(&mut config);

        let state = Arc::new(AppState::new(config).await.expect("app state"));
        Self {
            router: build_router(state.clone()),
            state,
            data_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }
}

/// 断言为统一错误信封
pub fn assert_error_envelope(body: &Value, kind: &str) {
    assert_eq!(body["success"], false, "body: {}", body);
    assert_eq!(body["error"], kind, "body: {}", body);
    assert!(body["message"].as_str().map_or(false, |m| !m.is_empty()), "body: {}", body);
}
