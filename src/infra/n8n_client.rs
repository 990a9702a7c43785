//! n8n HTTP Client
//!
//! 封装与 n8n（webhook 与 REST API）的所有 HTTP 交互，复用连接池。
//! 每个请求只尝试一次，不重试。

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::env::constants::PROBE_TIMEOUT_SECS;
use crate::config::target::{N8nTarget, HEADER_N8N_API_KEY, HEADER_N8N_URL};
use crate::domain::n8n::{decode_body, extract_message};
use crate::domain::workflow::WorkflowSummary;

/// REST API 分页大小
const WORKFLOW_PAGE_LIMIT: usize = 250;
/// 最多翻页次数
const WORKFLOW_MAX_PAGES: usize = 20;

/// 不转发给上游的请求头
const SKIPPED_HEADERS: [&str; 14] = [
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "accept-encoding",
    "cookie",
    "origin",
];

/// 一次转发请求
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub api_key: Option<String>,
}

impl ForwardRequest {
    /// JSON POST
    pub fn post_json<T: Serialize>(url: impl Into<String>, payload: &T, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let url = url.into();
        let body = serde_json::to_vec(payload).map_err(|e| UpstreamError::InvalidResponse {
            url: url.clone(),
            message: format!("Failed to encode request body: {}", e),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            method: Method::POST,
            url,
            headers,
            body: Bytes::from(body),
            api_key,
        })
    }

    /// 无 body 的 GET
    pub fn get(url: impl Into<String>, api_key: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            body: Bytes::new(),
            api_key,
        }
    }
}

/// 上游成功响应（已解码）
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamResponse {
    /// 回给调用方的状态码：204 没有 body，改为 200 以携带整形后的结果
    pub fn reply_status(&self) -> StatusCode {
        if self.status == StatusCode::NO_CONTENT {
            StatusCode::OK
        } else {
            self.status
        }
    }
}

/// 连接探测结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub url: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// n8n 客户端
#[derive(Clone)]
pub struct N8nClient {
    client: Client,
}

impl N8nClient {
    /// 创建新的 n8n 客户端
    ///
    /// # Arguments
    /// * `timeout_secs` - 单个请求的超时时间
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client })
    }

    /// 转发请求并解码响应
    ///
    /// - 网络错误 / 超时 → `UpstreamError::Unreachable`
    /// - 非 2xx → `UpstreamError::Status`（保留上游状态码）
    /// - body 无法解码 → `UpstreamError::InvalidResponse`
    pub async fn forward(&self, request: ForwardRequest) -> Result<UpstreamResponse, UpstreamError> {
        let started = Instant::now();
        let mut headers = forwardable_headers(&request.headers);
        if let Some(key) = request.api_key.as_deref() {
            if let Ok(value) = HeaderValue::from_str(key) {
                headers.insert(HeaderName::from_static(HEADER_N8N_API_KEY), value);
            }
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(
                method = %request.method,
                url = %request.url,
                error = %e,
                "n8n request failed"
            );
            UpstreamError::Unreachable {
                url: request.url.clone(),
                message: describe_reqwest_error(&e),
            }
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(|e| UpstreamError::Unreachable {
            url: request.url.clone(),
            message: describe_reqwest_error(&e),
        })?;

        info!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "n8n request completed"
        );

        let decoded = decode_body(&bytes, content_type.as_deref());

        if !status.is_success() {
            let message = decoded
                .ok()
                .and_then(|v| extract_message(&v))
                .unwrap_or_else(|| {
                    format!(
                        "n8n responded with {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("")
                    )
                    .trim_end()
                    .to_string()
                });
            return Err(UpstreamError::Status {
                url: request.url,
                status: status.as_u16(),
                message,
            });
        }

        let body = decoded.map_err(|e| {
            debug!(url = %request.url, error = %e, "n8n returned malformed JSON");
            UpstreamError::InvalidResponse {
                url: request.url.clone(),
                message: format!("n8n returned invalid JSON: {}", e),
            }
        })?;

        Ok(UpstreamResponse { status, body })
    }

    /// 以 JSON 调用 webhook，返回解码后的 body
    pub async fn post_json<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
        api_key: Option<String>,
    ) -> Result<Value, UpstreamError> {
        let request = ForwardRequest::post_json(url, payload, api_key)?;
        Ok(self.forward(request).await?.body)
    }

    /// 列出所有 workflow（按 cursor 翻页）
    pub async fn list_workflows(&self, target: &N8nTarget) -> Result<Vec<WorkflowSummary>, UpstreamError> {
        let mut workflows = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..WORKFLOW_MAX_PAGES {
            let url = workflows_page_url(target, cursor.as_deref())?;
            let page = self
                .forward(ForwardRequest::get(url, target.api_key.clone()))
                .await?
                .body;
            workflows.extend(WorkflowSummary::list_from_value(&page));

            cursor = page
                .get("nextCursor")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }
        }

        Ok(workflows)
    }

    /// 激活 / 停用 workflow
    pub async fn set_workflow_active(
        &self,
        target: &N8nTarget,
        workflow_id: &str,
        active: bool,
    ) -> Result<Option<WorkflowSummary>, UpstreamError> {
        let action = if active { "activate" } else { "deactivate" };
        let url = workflow_action_url(target, workflow_id, action)?;
        let request = ForwardRequest {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            api_key: target.api_key.clone(),
        };

        let body = self.forward(request).await?.body;
        Ok(WorkflowSummary::from_value(&body))
    }

    /// 探测 n8n 是否可达（短超时，任何 HTTP 响应都算可达）
    pub async fn probe(&self, target: &N8nTarget) -> ProbeResult {
        let url = target.health_url();
        let started = Instant::now();
        let result = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => ProbeResult {
                url,
                reachable: true,
                status: Some(resp.status().as_u16()),
                latency_ms,
                error: None,
            },
            Err(e) => {
                warn!(url = %url, error = %e, "n8n probe failed");
                ProbeResult {
                    url,
                    reachable: false,
                    status: None,
                    latency_ms,
                    error: Some(describe_reqwest_error(&e)),
                }
            }
        }
    }
}

/// 过滤掉 hop-by-hop 头、覆盖头以及由 client 自己管理的头
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        let lower = name.as_str();
        if SKIPPED_HEADERS.contains(&lower)
            || lower == HEADER_N8N_URL
            || lower == HEADER_N8N_API_KEY
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Timed out waiting for n8n".to_string()
    } else if e.is_connect() {
        format!("Could not connect to n8n: {}", e)
    } else {
        format!("Request to n8n failed: {}", e)
    }
}

fn parse_api_url(raw: &str) -> Result<Url, UpstreamError> {
    Url::parse(raw).map_err(|e| UpstreamError::Unreachable {
        url: raw.to_string(),
        message: format!("Invalid n8n URL: {}", e),
    })
}

/// `GET {base}/api/v1/workflows?limit=..&cursor=..`
fn workflows_page_url(target: &N8nTarget, cursor: Option<&str>) -> Result<String, UpstreamError> {
    let mut url = parse_api_url(&target.api_url("workflows"))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("limit", &WORKFLOW_PAGE_LIMIT.to_string());
        if let Some(cursor) = cursor {
            query.append_pair("cursor", cursor);
        }
    }
    Ok(url.to_string())
}

/// `POST {base}/api/v1/workflows/{id}/{action}`，id 作为单个路径段编码
fn workflow_action_url(target: &N8nTarget, workflow_id: &str, action: &str) -> Result<String, UpstreamError> {
    let raw = target.api_url("workflows");
    let mut url = parse_api_url(&raw)?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::Unreachable {
            url: raw.clone(),
            message: "n8n URL cannot carry a path".to_string(),
        })?
        .push(workflow_id)
        .push(action);
    Ok(url.to_string())
}

/// 上游调用错误
#[derive(Debug)]
pub enum UpstreamError {
    /// 网络错误 / 超时
    Unreachable { url: String, message: String },
    /// 上游返回非 2xx
    Status { url: String, status: u16, message: String },
    /// 上游 body 无法解析
    InvalidResponse { url: String, message: String },
}

impl UpstreamError {
    /// 对外返回的 HTTP 状态码：上游状态码原样返回，其余为 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Unreachable { .. } => "upstream_unreachable",
            UpstreamError::Status { .. } => "upstream_error",
            UpstreamError::InvalidResponse { .. } => "invalid_upstream_response",
        }
    }

    pub fn message(&self) -> String {
        match self {
            UpstreamError::Unreachable { message, .. }
            | UpstreamError::Status { message, .. }
            | UpstreamError::InvalidResponse { message, .. } => message.clone(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            UpstreamError::Unreachable { url, .. }
            | UpstreamError::Status { url, .. }
            | UpstreamError::InvalidResponse { url, .. } => Some(url.as_str()),
        }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamError::Unreachable { url, message } => write!(f, "{} ({})", message, url),
            UpstreamError::Status { url, status, message } => {
                write!(f, "{} returned {}: {}", url, status, message)
            }
            UpstreamError::InvalidResponse { url, message } => write!(f, "{} ({})", message, url),
        }
    }
}

impl std::error::Error for UpstreamError {}
