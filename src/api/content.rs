//! 内容工作室与图片实验室 API
//!
//! 包含 /api/content/generate, /api/images/enhance 端点

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::domain::content::{ContentRequest, EnhancedImage, GeneratedContent, ImageEnhanceRequest};
use crate::domain::workflow::WorkflowKind;
use crate::error::{ApiError, ApiResult};
use crate::infra::UpstreamError;
use crate::middleware::{ApiJson, N8nOverrides};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct GenerateResponse {
    success: bool,
    #[serde(flatten)]
    content: GeneratedContent,
}

#[derive(Debug, Serialize)]
struct EnhanceResponse {
    success: bool,
    #[serde(flatten)]
    image: EnhancedImage,
}

/// 创建内容路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/content/generate", post(generate_content))
        .route("/api/images/enhance", post(enhance_image))
}

/// 生成社媒文案
///
/// POST /api/content/generate
async fn generate_content(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ContentRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    request.validate().map_err(ApiError::bad_request)?;

    // 用目录中的产品信息丰富请求
    let product = match request.product_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(id) => Some(
            state
                .products
                .get(id)
                .await
                .ok_or_else(|| ApiError::not_found(format!("Product {}", id)))?,
        ),
        None => None,
    };

    let (target, url) = state
        .workflow_target(WorkflowKind::ContentGenerate, &overrides)
        .await;

    let payload = json!({
        "topic": request.topic,
        "platforms": request.platforms,
        "tone": request.tone.as_deref().unwrap_or("friendly"),
        "language": request.language.as_deref().unwrap_or("en"),
        "product": product,
    });

    info!(
        url = %url,
        product_id = ?request.product_id,
        platforms = request.platforms.len(),
        "Requesting content generation"
    );

    let body = state.n8n.post_json(&url, &payload, target.api_key.clone()).await?;
    let content = GeneratedContent::from_value(body).ok_or_else(|| UpstreamError::InvalidResponse {
        url: url.clone(),
        message: "n8n response did not contain a caption".to_string(),
    })?;

    Ok(Json(GenerateResponse {
        success: true,
        content,
    }))
}

/// 图片增强
///
/// POST /api/images/enhance
async fn enhance_image(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ImageEnhanceRequest>,
) -> ApiResult<Json<EnhanceResponse>> {
    request.validate().map_err(ApiError::bad_request)?;

    let product = match request.product_id.as_deref() {
        Some(id) => state.products.get(id).await,
        None => None,
    };

    let (target, url) = state
        .workflow_target(WorkflowKind::ImageEnhance, &overrides)
        .await;

    let payload = json!({
        "imageUrl": request.image_url.trim(),
        "style": request.style.as_deref().unwrap_or("studio"),
        "prompt": request.prompt,
        "product": product,
    });

    info!(url = %url, style = ?request.style, "Requesting image enhancement");

    let body = state.n8n.post_json(&url, &payload, target.api_key.clone()).await?;
    let image = EnhancedImage::from_value(body).ok_or_else(|| UpstreamError::InvalidResponse {
        url: url.clone(),
        message: "n8n response did not contain an image URL".to_string(),
    })?;

    Ok(Json(EnhanceResponse {
        success: true,
        image,
    }))
}
