//! 社媒发布 API
//!
//! 包含 /api/social/post 端点

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::content::SocialPostRequest;
use crate::domain::n8n::normalize_object;
use crate::domain::post::{validate_caption, PostInput, PostStatus, ScheduledPost};
use crate::domain::workflow::WorkflowKind;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, N8nOverrides};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct PublishResponse {
    success: bool,
    /// 写入日历的记录；记录失败时为空
    #[serde(skip_serializing_if = "Option::is_none")]
    post: Option<ScheduledPost>,
    result: Value,
}

/// 创建发布路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/social/post", post(publish_post))
}

/// 发布或排期帖子
///
/// POST /api/social/post
///
/// 调用 social-post webhook，并把结果记录到内容日历：
/// 未来时间记为 scheduled，立即发布记为 published，上游失败记为 failed
async fn publish_post(
    N8nOverrides(overrides): N8nOverrides,
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SocialPostRequest>,
) -> ApiResult<Json<PublishResponse>> {
    validate_caption(&request.caption, &request.platforms).map_err(ApiError::bad_request)?;

    let now = Utc::now();
    let scheduled = request.scheduled_at.map_or(false, |at| at > now);

    let product = match request.product_id.as_deref() {
        Some(id) => state.products.get(id).await,
        None => None,
    };

    let (target, url) = state
        .workflow_target(WorkflowKind::SocialPost, &overrides)
        .await;

    let payload = json!({
        "title": request.title,
        "caption": request.caption,
        "platforms": request.platforms,
        "imageUrl": request.image_url,
        "scheduledAt": request.scheduled_at,
        "publishNow": !scheduled,
        "product": product,
    });

    info!(
        url = %url,
        platforms = request.platforms.len(),
        scheduled = scheduled,
        "Publishing social post"
    );

    let result = state.n8n.post_json(&url, &payload, target.api_key.clone()).await;

    let mut record = ScheduledPost::create(&PostInput {
        title: request.title.clone().unwrap_or_default(),
        caption: request.caption.clone(),
        platforms: request.platforms.clone(),
        image_url: request.image_url.clone(),
        product_id: request.product_id.clone(),
        scheduled_at: request.scheduled_at.unwrap_or(now),
        status: Some(if scheduled {
            PostStatus::Scheduled
        } else {
            PostStatus::Published
        }),
    });

    match result {
        Ok(body) => {
            let recorded = match state.schedule.insert(record).await {
                Ok(saved) => Some(saved),
                Err(e) => {
                    error!(error = %e, "Post was sent but could not be recorded");
                    None
                }
            };
            Ok(Json(PublishResponse {
                success: true,
                post: recorded,
                result: normalize_object(body),
            }))
        }
        Err(e) => {
            warn!(error = %e, "Social post webhook failed");
            record.mark_failed(e.message());
            if let Err(save_err) = state.schedule.insert(record).await {
                error!(error = %save_err, "Failed to record failed post");
            }
            Err(e.into())
        }
    }
}
