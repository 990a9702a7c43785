//! 媒体库 API
//!
//! 包含 /api/library/list, /api/library/upload 端点

use axum::{
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::drive::DriveListing;
use crate::domain::n8n::normalize_object;
use crate::domain::workflow::WorkflowKind;
use crate::error::{ApiError, ApiResult};
use crate::infra::ForwardRequest;
use crate::middleware::{ApiBytes, N8nOverrides};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    total: usize,
    #[serde(flatten)]
    listing: DriveListing,
}

/// 创建媒体库路由
///
/// 上传路由单独放宽 body 上限
pub fn router(upload_max_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/library/list", get(list_files))
        .route(
            "/api/library/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_max_bytes)),
        )
}

/// 列出媒体库文件
///
/// GET /api/library/list
/// query（folderId、pageToken 等）原样转发
async fn list_files(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<ListResponse>> {
    let (target, mut url) = state
        .workflow_target(WorkflowKind::LibraryList, &overrides)
        .await;
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&query);
    }

    let upstream = state
        .n8n
        .forward(ForwardRequest::get(url.clone(), target.api_key.clone()))
        .await?;
    let listing = DriveListing::from_value(&upstream.body);

    info!(url = %url, files = listing.files.len(), "Listed media library");

    Ok(Json(ListResponse {
        success: true,
        total: listing.files.len(),
        listing,
    }))
}

/// 上传文件到媒体库
///
/// POST /api/library/upload
/// body（通常为 multipart/form-data）与 content-type 原样转发
async fn upload_file(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiBytes(body): ApiBytes,
) -> ApiResult<Response> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Upload body is empty"));
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        return Err(ApiError::bad_request("Content-Type header is required"));
    }

    let (target, url) = state
        .workflow_target(WorkflowKind::LibraryUpload, &overrides)
        .await;

    info!(
        url = %url,
        bytes = body.len(),
        content_type = ?headers.get(header::CONTENT_TYPE),
        "Uploading to media library"
    );

    let upstream = state
        .n8n
        .forward(ForwardRequest {
            method: Method::POST,
            url,
            headers,
            body,
            api_key: target.api_key.clone(),
        })
        .await?;

    Ok((upstream.reply_status(), Json(normalize_object(upstream.body))).into_response())
}
