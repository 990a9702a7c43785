//! 健康检查、状态与仪表盘 API
//!
//! 包含 /health, /api/status, /api/dashboard 端点

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::env::constants::{UPCOMING_POSTS_LIMIT, VERSION};
use crate::config::N8nTarget;
use crate::domain::post::ScheduledPost;
use crate::domain::settings::N8NSettings;
use crate::domain::workflow::WorkflowKind;
use crate::infra::ProbeResult;
use crate::middleware::N8nOverrides;
use crate::state::{AppState, StatusCounts};

/// 健康检查响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    timestamp: String,
    uptime_secs: i64,
}

/// 状态响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: &'static str,
    n8n_base_url: String,
    has_api_key: bool,
    /// 是否使用了持久化设置
    settings_configured: bool,
    webhooks: BTreeMap<WorkflowKind, String>,
    n8n: ProbeResult,
}

/// 仪表盘响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    products_total: usize,
    products_active: usize,
    posts: StatusCounts,
    upcoming: Vec<ScheduledPost>,
    n8n_base_url: String,
    has_api_key: bool,
    webhooks: BTreeMap<WorkflowKind, String>,
}

/// 创建健康检查路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/status", get(get_status))
        .route("/api/dashboard", get(get_dashboard))
}

/// 健康检查
///
/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "command-center",
        version: VERSION,
        timestamp: Utc::now().to_rfc3339(),
        uptime_secs: state.uptime_secs(),
    })
}

/// 配置摘要与 n8n 连通性
///
/// GET /api/status
async fn get_status(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
) -> Json<StatusResponse> {
    let settings = state.settings.get().await;
    let target = state.target(&overrides).await;

    let webhooks = resolve_webhooks(&state, &target, &settings);

    let probe = state.n8n.probe(&target).await;

    Json(StatusResponse {
        version: VERSION,
        n8n_base_url: target.base_url.clone(),
        has_api_key: target.api_key.is_some(),
        settings_configured: settings != N8NSettings::default(),
        webhooks,
        n8n: probe,
    })
}

/// 仪表盘汇总
///
/// GET /api/dashboard
async fn get_dashboard(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
) -> Json<DashboardResponse> {
    let (products_total, products_active) = state.products.count().await;
    let posts = state.schedule.status_counts().await;
    let upcoming = state.schedule.upcoming(Utc::now(), UPCOMING_POSTS_LIMIT).await;
    let settings = state.settings.get().await;
    let target = state.target(&overrides).await;
    let webhooks = resolve_webhooks(&state, &target, &settings);

    Json(DashboardResponse {
        products_total,
        products_active,
        posts,
        upcoming,
        n8n_base_url: target.base_url.clone(),
        has_api_key: target.api_key.is_some(),
        webhooks,
    })
}

/// 每个 workflow 当前生效的 webhook URL
fn resolve_webhooks(
    state: &AppState,
    target: &N8nTarget,
    settings: &N8NSettings,
) -> BTreeMap<WorkflowKind, String> {
    WorkflowKind::ALL
        .iter()
        .map(|kind| (*kind, target.workflow_url(*kind, &state.config, settings)))
        .collect()
}
