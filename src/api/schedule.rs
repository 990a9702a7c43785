//! 内容日历 API
//!
//! 包含 /api/schedule, /api/calendar 端点

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;

use crate::domain::calendar::{month_range, CalendarMonth};
use crate::domain::post::{Platform, PostInput, PostStatus};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, ApiQuery};
use crate::state::{AppState, PostFilter};

/// 列表查询参数
///
/// `from` / `to` 为 RFC 3339 时间；未编码的 `+00:00` 偏移会被 query 解码成空格，这里按 `+` 处理
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    #[serde(default, deserialize_with = "query_datetime")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "query_datetime")]
    pub to: Option<DateTime<Utc>>,
    pub platform: Option<Platform>,
    pub status: Option<PostStatus>,
}

/// 月视图查询参数，缺省为当前月
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// 创建日历路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/schedule", get(list_posts).post(create_post))
        .route(
            "/api/schedule/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/calendar", get(get_calendar))
}

/// GET /api/schedule
async fn list_posts(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ScheduleQuery>,
) -> ApiResult<impl IntoResponse> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::bad_request("'from' must not be after 'to'"));
        }
    }

    let filter = PostFilter {
        from: query.from,
        to: query.to,
        platform: query.platform,
        status: query.status,
    };
    let posts = state.schedule.list(&filter).await;
    Ok(Json(json!({ "success": true, "total": posts.len(), "posts": posts })))
}

/// GET /api/schedule/:id
async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post = state
        .schedule
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Post {}", id)))?;
    Ok(Json(json!({ "success": true, "post": post })))
}

/// POST /api/schedule
async fn create_post(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<impl IntoResponse> {
    input.validate().map_err(ApiError::bad_request)?;
    let post = state.schedule.create(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "post": post })),
    ))
}

/// PUT /api/schedule/:id
async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<impl IntoResponse> {
    input.validate().map_err(ApiError::bad_request)?;
    let post = state
        .schedule
        .update(&id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {}", id)))?;
    Ok(Json(json!({ "success": true, "post": post })))
}

/// DELETE /api/schedule/:id
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    if !state.schedule.delete(&id).await? {
        return Err(ApiError::not_found(format!("Post {}", id)));
    }
    Ok(Json(json!({ "success": true, "id": id })))
}

/// 月视图
///
/// GET /api/calendar?year=2026&month=10
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> ApiResult<impl IntoResponse> {
    let today = Utc::now();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let (start, end) = month_range(year, month)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid month {}-{}", year, month)))?;

    let posts = state
        .schedule
        .list(&PostFilter {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        })
        .await;

    let calendar = CalendarMonth::build(year, month, &posts)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid month {}-{}", year, month)))?;

    Ok(Json(json!({ "success": true, "calendar": calendar })))
}

fn query_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|v| parse_query_datetime(&v).map_err(serde::de::Error::custom))
        .transpose()
}

/// 解析 query 中的时间，恢复被解码成空格的时区 `+`
fn parse_query_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let value = raw.trim();
    let value = match value.len().checked_sub(6) {
        Some(i) if value.as_bytes()[i] == b' ' => format!("{}+{}", &value[..i], &value[i + 1..]),
        _ => value.to_string(),
    };
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_datetime() {
        let expected = "2026-10-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_query_datetime("2026-10-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_query_datetime("2026-10-01T00:00:00 00:00").unwrap(), expected);
        assert_eq!(parse_query_datetime("2026-10-01T02:00:00+02:00").unwrap(), expected);
        assert!(parse_query_datetime("next tuesday").is_err());
    }
}
