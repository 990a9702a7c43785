//! 连接设置 API
//!
//! 包含 /api/settings, /api/settings/test 端点

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::N8nTarget;
use crate::domain::settings::{mask_secret, N8NSettings};
use crate::error::{ApiError, ApiResult};
use crate::infra::ProbeResult;
use crate::middleware::{ApiJson, N8nOverrides};
use crate::state::{AppState, SettingsError};

#[derive(Debug, Serialize)]
struct SettingsResponse {
    success: bool,
    settings: N8NSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionTestResponse {
    success: bool,
    base_url: String,
    probe: ProbeResult,
    /// 配置了 API key 时返回可见的 workflow 数量
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_error: Option<String>,
}

/// 创建设置路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/settings",
            get(get_settings).put(update_settings).delete(reset_settings),
        )
        .route("/api/settings/test", post(test_connection))
}

/// 读取设置（API key 脱敏）
///
/// GET /api/settings
async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        success: true,
        settings: state.settings.get().await.masked(),
    })
}

/// 替换设置
///
/// PUT /api/settings
/// 客户端回传的脱敏 API key 视为"保持不变"
async fn update_settings(
    State(state): State<Arc<AppState>>,
    ApiJson(mut settings): ApiJson<N8NSettings>,
) -> ApiResult<Json<SettingsResponse>> {
    let current = state.settings.get().await;
    if let (Some(incoming), Some(existing)) = (settings.api_key.as_deref(), current.api_key.as_deref()) {
        if incoming == mask_secret(existing) {
            settings.api_key = current.api_key.clone();
        }
    }

    let saved = state.settings.replace(settings).await.map_err(|e| match e {
        SettingsError::Invalid(msg) => ApiError::bad_request(msg),
        SettingsError::Persist(e) => ApiError::from(e),
    })?;

    Ok(Json(SettingsResponse {
        success: true,
        settings: saved.masked(),
    }))
}

/// 恢复默认设置
///
/// DELETE /api/settings
async fn reset_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<SettingsResponse>> {
    state.settings.reset().await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings: N8NSettings::default(),
    }))
}

/// 测试 n8n 连接
///
/// POST /api/settings/test
/// 使用当前生效的目标（可被请求头覆盖），探测可达性并在有 API key 时尝试列出 workflow
async fn test_connection(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
) -> Json<ConnectionTestResponse> {
    let target: N8nTarget = state.target(&overrides).await;
    let probe = state.n8n.probe(&target).await;

    let (workflow_count, api_error) = if probe.reachable && target.api_key.is_some() {
        match state.n8n.list_workflows(&target).await {
            Ok(workflows) => (Some(workflows.len()), None),
            Err(e) => (None, Some(e.message())),
        }
    } else {
        (None, None)
    };

    let success = probe.reachable && api_error.is_none();
    info!(
        base_url = %target.base_url,
        reachable = probe.reachable,
        workflow_count = ?workflow_count,
        "Tested n8n connection"
    );

    Json(ConnectionTestResponse {
        success,
        base_url: target.base_url,
        probe,
        workflow_count,
        api_error,
    })
}
