//! 通用 webhook 代理与 workflow 管理 API
//!
//! 包含 /api/n8n/*path 与 /api/n8n-workflows 端点

use axum::{
    extract::{DefaultBodyLimit, Path, RawQuery, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::n8n::normalize_object;
use crate::domain::workflow::WorkflowSummary;
use crate::error::{ApiError, ApiResult};
use crate::infra::ForwardRequest;
use crate::middleware::{ApiBytes, N8nOverrides};
use crate::state::AppState;

/// workflow 列表响应
#[derive(Debug, Serialize)]
struct WorkflowListResponse {
    success: bool,
    total: usize,
    workflows: Vec<WorkflowSummary>,
}

/// 创建代理路由
///
/// 通用代理与上传共用 body 上限
pub fn router(body_max_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/n8n/*path",
            any(proxy_webhook).layer(DefaultBodyLimit::max(body_max_bytes)),
        )
        .route("/api/n8n-workflows", get(list_workflows))
        .route("/api/n8n-workflows/:id/activate", post(activate_workflow))
        .route("/api/n8n-workflows/:id/deactivate", post(deactivate_workflow))
}

/// 转发任意请求到 `{base}/webhook/{path}`
///
/// ANY /api/n8n/*path
async fn proxy_webhook(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> ApiResult<Response> {
    if path.split('/').any(|segment| segment == "..") {
        return Err(ApiError::bad_request("Webhook path must not contain '..'"));
    }

    let target = state.target(&overrides).await;
    let mut url = target.webhook_url(&path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(&query);
    }

    info!(method = %method, path = %path, url = %url, "Proxying webhook request");

    let upstream = state
        .n8n
        .forward(ForwardRequest {
            method,
            url,
            headers,
            body,
            api_key: target.api_key.clone(),
        })
        .await?;

    Ok((upstream.reply_status(), Json(normalize_object(upstream.body))).into_response())
}

/// 列出 n8n workflows
///
/// GET /api/n8n-workflows
/// 需要 n8n API key（请求头、设置或环境变量）
async fn list_workflows(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WorkflowListResponse>> {
    let target = state.target(&overrides).await;
    if target.api_key.is_none() {
        return Err(ApiError::bad_request(
            "n8n API key is not configured (set it in settings, N8N_API_KEY or the X-N8N-API-KEY header)",
        ));
    }

    let workflows = state.n8n.list_workflows(&target).await?;
    info!(count = workflows.len(), base_url = %target.base_url, "Listed n8n workflows");

    Ok(Json(WorkflowListResponse {
        success: true,
        total: workflows.len(),
        workflows,
    }))
}

/// POST /api/n8n-workflows/:id/activate
async fn activate_workflow(
    overrides: N8nOverrides,
    state: State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    set_active(overrides, state, id, true).await
}

/// POST /api/n8n-workflows/:id/deactivate
async fn deactivate_workflow(
    overrides: N8nOverrides,
    state: State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    set_active(overrides, state, id, false).await
}

async fn set_active(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    id: String,
    active: bool,
) -> ApiResult<Json<serde_json::Value>> {
    let target = state.target(&overrides).await;
    if target.api_key.is_none() {
        return Err(ApiError::bad_request("n8n API key is not configured"));
    }

    let workflow = state.n8n.set_workflow_active(&target, &id, active).await?;
    info!(workflow_id = %id, active = active, "Toggled n8n workflow");

    Ok(Json(serde_json::json!({
        "success": true,
        "id": id,
        "active": active,
        "workflow": workflow,
    })))
}
